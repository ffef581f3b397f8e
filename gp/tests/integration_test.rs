//! Integration tests for goalplanner
//!
//! These tests drive the engine, the assistant and the snapshot store
//! together through the public API.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use goalplanner::advisory::FallbackAdvisor;
use goalplanner::engine::{
    DayLoad, PlacementPlanner, ProposedMove, ReflowPlanner, StepDraft, build_load_index, find_date_with_min_load,
    find_next_free_date,
};
use goalplanner::{
    Assistant, BusyPeriod, EngineConfig, GoalId, ReflowOutcome, Snapshot, SnapshotStore, Step, StepId, StepStatus,
};
use tempfile::TempDir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn step(id: u64, goal: u64, day: NaiveDate) -> Step {
    Step::new(StepId(id), GoalId(goal), format!("step {}", id)).on(day)
}

// =============================================================================
// Engine Scenarios
// =============================================================================

#[test]
fn test_full_day_pushes_placement_forward() {
    let steps = vec![step(1, 1, d(2025, 4, 3)), step(2, 2, d(2025, 4, 3))];
    let load = build_load_index(&steps);

    assert_eq!(find_date_with_min_load(&load, d(2025, 4, 3), 2), d(2025, 4, 4));
}

#[test]
fn test_next_free_date_skips_consecutive_busy_days() {
    let busy: BTreeSet<NaiveDate> = [d(2025, 5, 1), d(2025, 5, 2)].into_iter().collect();
    assert_eq!(find_next_free_date(&busy, d(2025, 5, 1)), d(2025, 5, 3));
}

#[test]
fn test_single_day_window_excludes_later_steps() {
    let steps = vec![
        step(1, 1, d(2025, 6, 10)),
        step(2, 1, d(2025, 6, 12)),
        step(3, 1, d(2025, 6, 15)),
    ];
    let busy = BusyPeriod::single_day(d(2025, 6, 10));
    let planner = ReflowPlanner::new(EngineConfig::default());

    let ids: Vec<StepId> = planner.candidates(&steps, &busy).iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![StepId(1), StepId(2)]);

    // a proposal for the excluded step is ignored; step 1 still leaves the
    // busy day and step 2 keeps its date
    let outcome = planner.plan(&steps, &busy, &[ProposedMove::new(StepId(3), d(2025, 6, 20))]);
    let got: Vec<(StepId, NaiveDate)> = outcome.assignments().iter().map(|a| (a.id, a.date)).collect();
    assert_eq!(got, vec![(StepId(1), d(2025, 6, 11))]);
}

#[test]
fn test_every_step_leaves_a_busy_range_without_proposals() {
    let steps = vec![step(1, 1, d(2025, 4, 2)), step(2, 2, d(2025, 4, 5)), step(3, 1, d(2025, 4, 11))];
    let busy = BusyPeriod::new(d(2025, 4, 1), d(2025, 4, 10));
    let outcome = ReflowPlanner::new(EngineConfig::default()).plan(&steps, &busy, &[]);

    let mut snapshot = Snapshot {
        steps,
        ..Default::default()
    };
    assert_eq!(snapshot.apply(outcome.assignments()), 2);

    let days: Vec<Option<NaiveDate>> = snapshot.steps.iter().map(Step::day).collect();
    assert_eq!(days, vec![Some(d(2025, 4, 12)), Some(d(2025, 4, 13)), Some(d(2025, 4, 11))]);
}

#[test]
fn test_colliding_proposals_are_displaced_in_order() {
    let steps = vec![step(1, 1, d(2025, 6, 28)), step(2, 1, d(2025, 6, 29))];
    let busy = BusyPeriod::new(d(2025, 6, 28), d(2025, 6, 30));
    let planner = ReflowPlanner::new(EngineConfig::default());

    let outcome = planner.plan(
        &steps,
        &busy,
        &[
            ProposedMove::new(StepId(1), d(2025, 7, 1)),
            ProposedMove::new(StepId(2), d(2025, 7, 1)),
        ],
    );

    let got: Vec<(StepId, NaiveDate)> = outcome.assignments().iter().map(|a| (a.id, a.date)).collect();
    assert_eq!(got, vec![(StepId(1), d(2025, 7, 1)), (StepId(2), d(2025, 7, 2))]);
}

#[test]
fn test_empty_candidates_is_distinct_outcome() {
    let steps = vec![step(1, 1, d(2025, 1, 1))];
    let busy = BusyPeriod::new(d(2025, 2, 1), d(2025, 2, 5));
    let outcome = ReflowPlanner::new(EngineConfig::default()).plan(&steps, &busy, &[]);

    assert_eq!(outcome, ReflowOutcome::NothingToReschedule { from: d(2025, 2, 1) });
}

#[test]
fn test_placement_incremental_load_across_goals() {
    let existing = vec![step(1, 1, d(2025, 4, 2)), step(2, 2, d(2025, 4, 3)), step(3, 2, d(2025, 4, 3))];
    let load = build_load_index(&existing);
    let drafts = vec![
        StepDraft::new("a", Some(d(2025, 4, 2))),
        StepDraft::new("b", Some(d(2025, 4, 2))),
        StepDraft::new("c", None),
    ];

    let placed = PlacementPlanner::new(EngineConfig::default()).place(&drafts, &load, d(2025, 4, 1));
    let days: Vec<NaiveDate> = placed.iter().map(|p| p.date).collect();
    // 04-02 fills after "a", 04-03 is already full
    assert_eq!(days, vec![d(2025, 4, 2), d(2025, 4, 4), d(2025, 4, 4)]);

    let mut after = load.clone();
    days.iter().for_each(|day| after.add(*day));
    assert!(after.iter().all(|(_, count)| count <= 2));
    assert_eq!(load, build_load_index(&existing));
}

#[test]
fn test_load_index_ignores_undated_and_excluded_steps() {
    let mut steps = vec![step(1, 1, d(2025, 4, 2)), step(2, 1, d(2025, 4, 2))];
    steps.push(Step::new(StepId(3), GoalId(1), "someday"));

    let load = DayLoad::build_excluding(&steps, Some(StepId(2)));
    assert_eq!(load.get(d(2025, 4, 2)), 1);
    assert_eq!(load.len(), 1);
}

// =============================================================================
// Assistant + Store
// =============================================================================

#[tokio::test]
async fn test_goal_then_reschedule_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = SnapshotStore::open(temp_dir.path().join("snapshot.json"));
    let assistant = Assistant::new(Arc::new(FallbackAdvisor), EngineConfig::default());
    let today = d(2025, 3, 30);

    // generate a goal into an empty snapshot
    let mut snapshot = store.load().unwrap();
    let plan = assistant.generate_goal("run a marathon", &snapshot.steps, today).await.unwrap();
    let goal_id = snapshot.insert_goal(&plan);
    store.save(&snapshot).unwrap();

    let snapshot = store.load().unwrap();
    let days: Vec<Option<NaiveDate>> = snapshot.steps_of(goal_id).map(Step::day).collect();
    assert_eq!(days, vec![Some(d(2025, 3, 31)), Some(d(2025, 4, 7))]);

    // tomorrow (03-31) becomes busy: only the first step moves
    let mut snapshot = snapshot;
    let report = assistant.reschedule("I'm sick", &snapshot.steps, today).await.unwrap();
    assert_eq!(report.busy, BusyPeriod::single_day(d(2025, 3, 31)));
    assert_eq!(snapshot.apply(report.outcome.assignments()), 1);
    store.save(&snapshot).unwrap();

    let snapshot = store.load().unwrap();
    let days: Vec<Option<NaiveDate>> = snapshot.steps_of(goal_id).map(Step::day).collect();
    assert_eq!(days, vec![Some(d(2025, 4, 1)), Some(d(2025, 4, 7))]);
}

#[tokio::test]
async fn test_reschedule_empty_snapshot_is_nothing_to_do() {
    let assistant = Assistant::new(Arc::new(FallbackAdvisor), EngineConfig::default());
    let report = assistant.reschedule("busy tomorrow", &[], d(2025, 3, 30)).await.unwrap();
    assert!(report.outcome.is_nothing_to_reschedule());
}

#[test]
fn test_progress_over_snapshot() {
    let mut snapshot = Snapshot::default();
    snapshot.goals.push(goalplanner::Goal::new(GoalId(1), "House"));
    snapshot.steps.push(step(1, 1, d(2025, 4, 1)).with_status(StepStatus::Done));
    snapshot.steps.push(step(2, 1, d(2025, 4, 2)));
    snapshot.steps.push(step(3, 1, d(2025, 4, 3)));

    assert_eq!(snapshot.goals[0].progress(&snapshot.steps), 33);
}
