//! Date-scheduling engine
//!
//! Pure functions of (current steps, request parameters) to date
//! assignments. Nothing here performs I/O, reads the clock, or keeps state
//! between calls; "today" is always passed in.
//!
//! # Architecture
//!
//! ```text
//! Step snapshot ──► DayLoad ──► slot finder ──► PlacementPlanner ──► PlacedStep[]
//!        │                          ▲
//!        └──► ReflowPlanner ────────┘ (collision resolution) ──► ReflowOutcome
//! ```
//!
//! Callers that need collision-freedom across concurrent requests for the
//! same user must serialize their writes; the engine only guarantees it
//! within a single call.

mod config;
mod load;
mod placement;
mod reflow;
mod slot;

pub use config::EngineConfig;
pub use load::{DayLoad, DayLoadEntry, build_load_index};
pub use placement::{PlacedStep, PlacementPlanner, StepDraft};
pub use reflow::{
    BusyPeriod, DateAssignment, ProposedMove, ReflowBatch, ReflowMode, ReflowOutcome, ReflowPlanner, ScheduledTask,
    SkipReason, SkippedMove,
};
pub use slot::{find_date_with_min_load, find_next_free_date};
