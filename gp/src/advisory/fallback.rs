//! Deterministic fallback advisory source
//!
//! Used when no language model is configured, so that goal generation and
//! rescheduling always have well-formed proposals to feed the planners.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use tracing::debug;

use super::proposal::{DEFAULT_GOAL_TITLE, RescheduleProposal, StepListProposal};
use super::{Advisor, AdvisoryError};
use crate::engine::{BusyPeriod, DayLoad, ProposedMove, ReflowMode, ScheduledTask, StepDraft};

/// Offsets from today of the fallback goal's steps
const FALLBACK_STEP_OFFSETS: [u64; 2] = [1, 8];

/// Rule-based advisor with no external dependency
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackAdvisor;

impl FallbackAdvisor {
    /// A two-step goal titled from the request
    pub fn propose_goal(request: &str, today: NaiveDate) -> StepListProposal {
        let title = request
            .split_whitespace()
            .take(3)
            .collect::<Vec<_>>()
            .join(" ");
        let goal_title = if title.is_empty() {
            DEFAULT_GOAL_TITLE.to_string()
        } else {
            title
        };

        let titles = ["Plan the first steps", "Review progress"];
        let steps = titles
            .iter()
            .zip(FALLBACK_STEP_OFFSETS)
            .map(|(title, offset)| StepDraft {
                title: (*title).to_string(),
                description: format!("Toward: {}", request.trim()),
                date: today.checked_add_days(Days::new(offset)),
            })
            .collect();

        StepListProposal { goal_title, steps }
    }

    /// Spacing-preserving moves out of the busy period
    ///
    /// Range mode shifts every candidate by the same number of days, just
    /// enough to put the earliest one after the busy end, so the gaps between
    /// tasks survive. Single-day mode moves only the tasks on the busy day to
    /// the day after. Tasks that need no move keep their date.
    pub fn propose_moves(tasks: &[ScheduledTask], busy: &BusyPeriod) -> RescheduleProposal {
        let shift = match busy.mode() {
            ReflowMode::Range => tasks
                .iter()
                .map(|t| t.date)
                .min()
                .filter(|first| *first <= busy.end())
                .map(|first| (busy.end() - first).num_days() + 1)
                .unwrap_or(0),
            ReflowMode::SingleDay => 1,
        };
        debug!(%busy, shift, "FallbackAdvisor::propose_moves: computed shift");

        let updates = tasks
            .iter()
            .map(|t| {
                let moves = match busy.mode() {
                    ReflowMode::Range => true,
                    ReflowMode::SingleDay => busy.contains(t.date),
                };
                let date = if moves && shift > 0 {
                    t.date.checked_add_days(Days::new(shift as u64)).unwrap_or(t.date)
                } else {
                    t.date
                };
                ProposedMove::new(t.id, date)
            })
            .collect();

        RescheduleProposal { updates }
    }
}

#[async_trait]
impl Advisor for FallbackAdvisor {
    fn name(&self) -> &'static str {
        "fallback"
    }

    /// Always tomorrow: free text is not understood without a model. Known
    /// dates go through `Assistant::reschedule_within` instead.
    async fn busy_period(&self, _problem: &str, today: NaiveDate) -> BusyPeriod {
        BusyPeriod::single_day(today.succ_opt().unwrap_or(today))
    }

    async fn step_list(
        &self,
        request: &str,
        _load: &DayLoad,
        today: NaiveDate,
    ) -> Result<StepListProposal, AdvisoryError> {
        Ok(Self::propose_goal(request, today))
    }

    async fn reschedule(
        &self,
        tasks: &[ScheduledTask],
        busy: &BusyPeriod,
        _today: NaiveDate,
    ) -> Result<RescheduleProposal, AdvisoryError> {
        Ok(Self::propose_moves(tasks, busy))
    }
}
