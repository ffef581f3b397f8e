//! Step domain type
//!
//! A Step is a dated or undated unit of work belonging to exactly one Goal.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::date::{at_midnight, deserialize_opt_datetime};
use super::id::{GoalId, StepId};

/// Step status
///
/// The scheduler never reads this; it only matters for goal progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not started yet
    #[default]
    Planned,
    /// Being worked on
    InProgress,
    /// Finished
    Done,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planned => write!(f, "planned"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// A single step of a goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Unique identifier
    pub id: StepId,

    /// Owning goal
    pub goal_id: GoalId,

    /// Short title
    pub title: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Workflow status
    #[serde(default)]
    pub status: StepStatus,

    /// Scheduled date-time; `None` for unscheduled steps
    #[serde(default, deserialize_with = "deserialize_opt_datetime")]
    pub date: Option<NaiveDateTime>,
}

impl Step {
    /// Create a planned step
    pub fn new(id: StepId, goal_id: GoalId, title: impl Into<String>) -> Self {
        Self {
            id,
            goal_id,
            title: title.into(),
            description: String::new(),
            status: StepStatus::Planned,
            date: None,
        }
    }

    /// Builder: schedule on `day` at midnight
    pub fn on(mut self, day: NaiveDate) -> Self {
        self.date = Some(at_midnight(day));
        self
    }

    /// Builder: set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set the status
    pub fn with_status(mut self, status: StepStatus) -> Self {
        self.status = status;
        self
    }

    /// The calendar day this step is scheduled on, if any
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.map(|dt| dt.date())
    }

    /// Move the step to midnight of `day`
    pub fn reschedule(&mut self, day: NaiveDate) {
        self.date = Some(at_midnight(day));
    }

    pub fn is_done(&self) -> bool {
        self.status == StepStatus::Done
    }
}
