//! Busy-period reflow planner
//!
//! Given a busy interval and advisory date proposals for the steps it
//! affects, produce final dates such that no step lands inside the busy
//! interval and no two rescheduled steps share a day.
//!
//! Proposals are advisory. The planner does not derive spacing itself; it
//! validates what it is given and de-collides it. Collision resolution is
//! order dependent: proposals are processed in the order presented, and each
//! resolved day is claimed before the next proposal is looked at.

use std::collections::{BTreeSet, HashSet};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::EngineConfig;
use super::slot::find_next_free_date;
use crate::domain::{Step, StepId};

/// A declared interval during which no steps should be scheduled
///
/// Both ends are inclusive. Construction normalizes reversed bounds, so
/// `start <= end` always holds, including for deserialized values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BusyBounds")]
pub struct BusyPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

/// Wire form of a busy period, bounds in any order
#[derive(Deserialize)]
struct BusyBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl From<BusyBounds> for BusyPeriod {
    fn from(bounds: BusyBounds) -> Self {
        Self::new(bounds.start, bounds.end)
    }
}

/// How the candidate set is chosen for a busy period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflowMode {
    /// `start == end`: only steps in a short window from the busy day move
    SingleDay,
    /// Every step from the busy start onward is a candidate
    Range,
}

impl BusyPeriod {
    /// Busy from `a` to `b` inclusive, in either order
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if b < a {
            debug!(%a, %b, "BusyPeriod::new: swapping reversed bounds");
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn mode(&self) -> ReflowMode {
        if self.start == self.end {
            ReflowMode::SingleDay
        } else {
            ReflowMode::Range
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Length of the interval in days, counting both ends
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// First day after the busy interval
    pub fn first_free_day(&self) -> NaiveDate {
        self.end.succ_opt().unwrap_or(self.end)
    }

    /// Whether a step dated `day` is a reflow candidate
    ///
    /// Single-day mode: `[start, start + window_days)`. Range mode: every day
    /// from `start` onward.
    pub fn is_candidate_day(&self, day: NaiveDate, window_days: u32) -> bool {
        if day < self.start {
            return false;
        }
        match self.mode() {
            ReflowMode::Range => true,
            ReflowMode::SingleDay => match self.start.checked_add_days(Days::new(u64::from(window_days))) {
                Some(window_end) => day < window_end,
                None => true,
            },
        }
    }
}

impl std::fmt::Display for BusyPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

/// A dated step considered for reflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledTask {
    #[serde(rename = "task_id")]
    pub id: StepId,
    pub title: String,
    #[serde(rename = "current_date")]
    pub date: NaiveDate,
}

/// A proposed new date for one step, as received from an advisory source
///
/// Either half may be missing when the source produced something unusable;
/// such entries are dropped and reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedMove {
    pub task_id: Option<StepId>,
    pub date: Option<NaiveDate>,
}

impl ProposedMove {
    pub fn new(task_id: StepId, date: NaiveDate) -> Self {
        Self {
            task_id: Some(task_id),
            date: Some(date),
        }
    }
}

/// Why a proposal was left out of the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingTaskId,
    UnparseableDate,
    /// The id is not among the candidate steps for this busy period
    NotACandidate,
    /// A proposal for the same step was already accepted
    Duplicate,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTaskId => write!(f, "missing task id"),
            Self::UnparseableDate => write!(f, "unparseable date"),
            Self::NotACandidate => write!(f, "not a reschedulable task"),
            Self::Duplicate => write!(f, "duplicate proposal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedMove {
    pub task_id: Option<StepId>,
    pub reason: SkipReason,
}

/// Final date for one step, safe to apply as a direct field update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAssignment {
    pub id: StepId,
    #[serde(rename = "resolved_date")]
    pub date: NaiveDate,
}

/// Assignments in processing order, plus the proposals that were dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReflowBatch {
    pub assignments: Vec<DateAssignment>,
    pub skipped: Vec<SkippedMove>,
}

/// Result of a reflow request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflowOutcome {
    /// Candidates existed and the batch was planned (possibly with every
    /// proposal skipped)
    Rescheduled(ReflowBatch),
    /// No dated step falls in the candidate window
    NothingToReschedule { from: NaiveDate },
}

impl ReflowOutcome {
    pub fn assignments(&self) -> &[DateAssignment] {
        match self {
            Self::Rescheduled(batch) => &batch.assignments,
            Self::NothingToReschedule { .. } => &[],
        }
    }

    pub fn is_nothing_to_reschedule(&self) -> bool {
        matches!(self, Self::NothingToReschedule { .. })
    }
}

/// Plans date changes for steps displaced by a busy period
#[derive(Debug, Clone)]
pub struct ReflowPlanner {
    config: EngineConfig,
}

impl ReflowPlanner {
    pub fn new(config: EngineConfig) -> Self {
        debug!(?config, "ReflowPlanner::new: called");
        Self { config }
    }

    /// Dated steps affected by `busy`, ordered by date ascending
    ///
    /// Ties keep snapshot order.
    pub fn candidates(&self, steps: &[Step], busy: &BusyPeriod) -> Vec<ScheduledTask> {
        let window = self.config.single_day_window_days;
        let mut tasks: Vec<ScheduledTask> = steps
            .iter()
            .filter_map(|s| s.day().map(|day| (s, day)))
            .filter(|(_, day)| busy.is_candidate_day(*day, window))
            .map(|(s, day)| ScheduledTask {
                id: s.id,
                title: s.title.clone(),
                date: day,
            })
            .collect();
        tasks.sort_by_key(|t| t.date);

        debug!(%busy, mode = ?busy.mode(), count = tasks.len(), "ReflowPlanner::candidates: selected");
        tasks
    }

    /// Validate and de-collide `proposals` for the steps affected by `busy`
    ///
    /// Days of non-candidate steps are immovable and seeded as occupied, as
    /// are the current days of unproposed candidates outside the busy
    /// interval. Every accepted proposal is clamped to the first day after
    /// the busy interval, then pushed forward to the first unclaimed day.
    /// Candidates still inside the interval without a usable proposal are
    /// moved last, in date order, to the first unclaimed day after it.
    pub fn plan(&self, steps: &[Step], busy: &BusyPeriod, proposals: &[ProposedMove]) -> ReflowOutcome {
        let candidates = self.candidates(steps, busy);
        if candidates.is_empty() {
            info!(%busy, "ReflowPlanner::plan: no tasks to reschedule");
            return ReflowOutcome::NothingToReschedule { from: busy.start() };
        }

        let candidate_ids: HashSet<StepId> = candidates.iter().map(|t| t.id).collect();

        let mut skipped = Vec::new();
        let mut accepted: Vec<(StepId, NaiveDate)> = Vec::new();
        let mut seen: HashSet<StepId> = HashSet::new();

        for proposal in proposals {
            let Some(id) = proposal.task_id else {
                skipped.push(SkippedMove {
                    task_id: None,
                    reason: SkipReason::MissingTaskId,
                });
                continue;
            };
            let reason = match (candidate_ids.contains(&id), proposal.date) {
                (false, _) => SkipReason::NotACandidate,
                (true, None) => SkipReason::UnparseableDate,
                (true, Some(_)) if seen.contains(&id) => SkipReason::Duplicate,
                (true, Some(date)) => {
                    seen.insert(id);
                    accepted.push((id, date));
                    continue;
                }
            };
            warn!(task_id = %id, %reason, "ReflowPlanner::plan: dropping proposal");
            skipped.push(SkippedMove {
                task_id: Some(id),
                reason,
            });
        }

        let (stranded, staying): (Vec<&ScheduledTask>, Vec<&ScheduledTask>) = candidates
            .iter()
            .filter(|t| !seen.contains(&t.id))
            .partition(|t| busy.contains(t.date));

        let mut occupied: BTreeSet<NaiveDate> = steps
            .iter()
            .filter(|s| !candidate_ids.contains(&s.id))
            .filter_map(Step::day)
            .collect();
        occupied.extend(staying.iter().map(|t| t.date));

        let floor = busy.first_free_day();
        let mut assignments = Vec::with_capacity(accepted.len() + stranded.len());
        for (id, proposed) in accepted {
            let start = proposed.max(floor);
            let resolved = find_next_free_date(&occupied, start);
            occupied.insert(resolved);

            if resolved != proposed {
                debug!(task_id = %id, %proposed, %resolved, "ReflowPlanner::plan: corrected proposal");
            }
            assignments.push(DateAssignment { id, date: resolved });
        }

        for task in stranded {
            let resolved = find_next_free_date(&occupied, floor);
            occupied.insert(resolved);

            warn!(
                task_id = %task.id,
                from = %task.date,
                to = %resolved,
                "ReflowPlanner::plan: no usable proposal, moving out of busy window"
            );
            assignments.push(DateAssignment {
                id: task.id,
                date: resolved,
            });
        }

        info!(
            %busy,
            rescheduled = assignments.len(),
            skipped = skipped.len(),
            "ReflowPlanner::plan: planned"
        );
        ReflowOutcome::Rescheduled(ReflowBatch { assignments, skipped })
    }
}
