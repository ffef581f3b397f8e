//! Goal initial-placement planner
//!
//! Places the steps of a brand-new goal on days that respect a per-day cap.
//! Drafts are placed in the order given, and each placement is counted
//! before the next draft is looked at, so two drafts sharing a candidate day
//! cannot both be pushed onto the same resolved day past the cap.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::EngineConfig;
use super::load::DayLoad;
use super::slot::find_date_with_min_load;

/// A proposed step for a new goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Candidate day; `None` when missing or unparseable
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl StepDraft {
    pub fn new(title: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            date,
        }
    }
}

/// A draft with its final day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedStep {
    pub title: String,
    pub description: String,
    /// Day the draft asked for, after the "tomorrow" substitution
    pub candidate: NaiveDate,
    /// Day the step was placed on
    pub date: NaiveDate,
}

impl PlacedStep {
    pub fn was_moved(&self) -> bool {
        self.candidate != self.date
    }
}

/// Places new-goal drafts under the per-day cap
#[derive(Debug, Clone)]
pub struct PlacementPlanner {
    config: EngineConfig,
}

impl PlacementPlanner {
    pub fn new(config: EngineConfig) -> Self {
        debug!(?config, "PlacementPlanner::new: called");
        Self { config }
    }

    /// Place `drafts` against the user's current load
    ///
    /// `load` must cover all of the user's existing steps across all goals.
    /// It is not modified; a working copy absorbs each placement in turn.
    pub fn place(&self, drafts: &[StepDraft], load: &DayLoad, today: NaiveDate) -> Vec<PlacedStep> {
        let tomorrow = today.succ_opt().unwrap_or(today);
        let cap = self.config.max_tasks_per_day;
        let mut working = load.clone();

        let placed: Vec<PlacedStep> = drafts
            .iter()
            .map(|draft| {
                let candidate = draft.date.unwrap_or_else(|| {
                    debug!(title = %draft.title, %tomorrow, "PlacementPlanner::place: no candidate date, using tomorrow");
                    tomorrow
                });
                let date = find_date_with_min_load(&working, candidate, cap);
                working.add(date);

                PlacedStep {
                    title: draft.title.clone(),
                    description: draft.description.clone(),
                    candidate,
                    date,
                }
            })
            .collect();

        info!(
            drafts = drafts.len(),
            moved = placed.iter().filter(|p| p.was_moved()).count(),
            cap,
            "PlacementPlanner::place: placed"
        );
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GoalId, Step, StepId};
    use crate::engine::build_load_index;
    use chrono::Days;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn load_of(days: &[NaiveDate]) -> DayLoad {
        let steps: Vec<Step> = days
            .iter()
            .enumerate()
            .map(|(i, day)| Step::new(StepId(i as u64), GoalId(1), "s").on(*day))
            .collect();
        build_load_index(&steps)
    }

    fn planner() -> PlacementPlanner {
        PlacementPlanner::new(EngineConfig::default())
    }

    #[test]
    fn test_full_day_pushes_to_next() {
        let load = load_of(&[d(2025, 4, 3), d(2025, 4, 3)]);
        let drafts = vec![StepDraft::new("Pick a plot", Some(d(2025, 4, 3)))];

        let placed = planner().place(&drafts, &load, d(2025, 4, 1));
        assert_eq!(placed[0].date, d(2025, 4, 4));
        assert!(placed[0].was_moved());
    }

    #[test]
    fn test_batch_is_counted_incrementally() {
        let load = DayLoad::default();
        let drafts = vec![
            StepDraft::new("a", Some(d(2025, 4, 3))),
            StepDraft::new("b", Some(d(2025, 4, 3))),
            StepDraft::new("c", Some(d(2025, 4, 3))),
        ];

        let dates: Vec<NaiveDate> = planner()
            .place(&drafts, &load, d(2025, 4, 1))
            .iter()
            .map(|p| p.date)
            .collect();
        assert_eq!(dates, vec![d(2025, 4, 3), d(2025, 4, 3), d(2025, 4, 4)]);
    }

    #[test]
    fn test_missing_date_uses_tomorrow() {
        let drafts = vec![StepDraft::new("whenever", None)];
        let placed = planner().place(&drafts, &DayLoad::default(), d(2025, 12, 31));
        assert_eq!(placed[0].candidate, d(2026, 1, 1));
        assert_eq!(placed[0].date, d(2026, 1, 1));
    }

    #[test]
    fn test_input_load_is_not_modified() {
        let load = load_of(&[d(2025, 4, 3)]);
        let before = load.clone();
        planner().place(&[StepDraft::new("a", Some(d(2025, 4, 3)))], &load, d(2025, 4, 1));
        assert_eq!(load, before);
    }

    #[test]
    fn test_cap_from_config() {
        let planner = PlacementPlanner::new(EngineConfig {
            max_tasks_per_day: 1,
            ..Default::default()
        });
        let load = load_of(&[d(2025, 4, 3)]);
        let placed = planner.place(&[StepDraft::new("a", Some(d(2025, 4, 3)))], &load, d(2025, 4, 1));
        assert_eq!(placed[0].date, d(2025, 4, 4));
    }

    proptest! {
        #[test]
        fn prop_placement_never_exceeds_cap_on_under_cap_days(
            existing in prop::collection::vec(0u64..15, 0..30),
            drafts in prop::collection::vec(prop::option::of(0u64..15), 0..20),
            cap in 1usize..4,
        ) {
            let base = d(2025, 3, 1);
            let existing_days: Vec<NaiveDate> = existing.iter().map(|o| base + Days::new(*o)).collect();
            let load = load_of(&existing_days);
            let drafts: Vec<StepDraft> = drafts
                .iter()
                .enumerate()
                .map(|(i, o)| StepDraft::new(format!("d{}", i), o.map(|o| base + Days::new(o))))
                .collect();

            let planner = PlacementPlanner::new(EngineConfig { max_tasks_per_day: cap, ..Default::default() });
            let placed = planner.place(&drafts, &load, base);
            prop_assert_eq!(placed.len(), drafts.len());

            let mut after = load.clone();
            for p in &placed {
                prop_assert!(p.date >= p.candidate);
                prop_assert!(load.get(p.date) < cap, "placed on a day that was already full");
                after.add(p.date);
            }
            for (day, count) in after.iter() {
                if load.get(day) < cap {
                    prop_assert!(count <= cap, "{} has {} tasks", day, count);
                }
            }
        }
    }
}
