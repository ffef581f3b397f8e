//! Advisory sources
//!
//! An advisory source proposes scheduling data (a busy period, a goal's step
//! list, new dates for existing steps) that the engine then validates and
//! corrects. Two sources exist: a language model, and a deterministic
//! fallback used when no model is configured.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

mod fallback;
mod model;
pub mod prompts;
mod proposal;

pub use fallback::FallbackAdvisor;
pub use model::ModelAdvisor;
pub use proposal::{
    BusyPeriodProposal, DEFAULT_GOAL_TITLE, DEFAULT_STEP_TITLE, Proposal, ProposalError, RescheduleProposal,
    StepListProposal, sanitize_response,
};

use crate::engine::{BusyPeriod, DayLoad, ScheduledTask};
use crate::llm::LlmError;

/// Errors from an advisory source that returned nothing usable
#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("advisory source unavailable: {0}")]
    Unavailable(#[from] LlmError),

    #[error("advisory source returned an empty response")]
    EmptyResponse,

    #[error("advisory source returned an unusable response: {0}")]
    Unusable(#[from] ProposalError),
}

/// A source of scheduling proposals
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Busy period described by `problem`
    ///
    /// Never fails: anything unusable resolves to the single day after
    /// `today`.
    async fn busy_period(&self, problem: &str, today: NaiveDate) -> BusyPeriod;

    /// Goal title and dated step drafts for `request`
    async fn step_list(&self, request: &str, load: &DayLoad, today: NaiveDate)
    -> Result<StepListProposal, AdvisoryError>;

    /// New dates for `tasks`, which are ordered by current date
    async fn reschedule(
        &self,
        tasks: &[ScheduledTask],
        busy: &BusyPeriod,
        today: NaiveDate,
    ) -> Result<RescheduleProposal, AdvisoryError>;
}
