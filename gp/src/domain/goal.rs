//! Goal domain type

use serde::{Deserialize, Serialize};

use super::id::GoalId;
use super::step::Step;

/// A user's top-level objective, composed of ordered Steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: GoalId,

    /// Short title
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Display color, opaque to the planner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Goal {
    pub fn new(id: GoalId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            color: None,
        }
    }

    /// Completion percentage over this goal's steps
    ///
    /// Steps belonging to other goals are ignored. A goal without steps is at
    /// 0%. The result is truncated toward zero.
    pub fn progress<'a>(&self, steps: impl IntoIterator<Item = &'a Step>) -> u8 {
        let (total, done) = steps
            .into_iter()
            .filter(|s| s.goal_id == self.id)
            .fold((0usize, 0usize), |(total, done), s| (total + 1, done + usize::from(s.is_done())));

        if total == 0 {
            return 0;
        }
        (done * 100 / total) as u8
    }
}
