//! Goalplanner - goals broken into dated steps
//!
//! A user states a goal in free text; an advisory source proposes a title and
//! dated steps, and the scheduling engine places them so that no day carries
//! more than a configured number of steps. When the user reports being busy,
//! the advisory source proposes new dates for the affected steps and the
//! engine corrects them so nothing lands inside the busy period and no two
//! moved steps share a day.
//!
//! # Modules
//!
//! - [`domain`] - Steps, goals, identifiers
//! - [`engine`] - Load index, slot finder, reflow and placement planners
//! - [`advisory`] - Proposals, prompts, model-backed and fallback advisors
//! - [`llm`] - LLM client trait and OpenAI-compatible implementation
//! - [`assistant`] - Request handling on top of advisors and engine
//! - [`store`] - JSON snapshot persistence
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod advisory;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod llm;
pub mod store;

// Re-export commonly used types
pub use assistant::{Assistant, AssistantError, GoalPlan, RescheduleReport};
pub use config::{Config, LlmConfig, StorageConfig};
pub use domain::{Goal, GoalId, Step, StepId, StepStatus};
pub use engine::{BusyPeriod, DateAssignment, EngineConfig, ReflowOutcome};
pub use store::{Snapshot, SnapshotStore};
