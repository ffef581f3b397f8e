//! JSON snapshot of goals and steps
//!
//! The engine never reads or writes storage. This store is the CLI's
//! collaborator: it loads the snapshot the engine is fed from, and applies
//! what the engine returns.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assistant::GoalPlan;
use crate::domain::{Goal, GoalId, Step, StepId};
use crate::engine::DateAssignment;

/// Every goal and step of a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Snapshot {
    /// Set the date of every assigned step; returns how many were found
    pub fn apply(&mut self, assignments: &[DateAssignment]) -> usize {
        let mut applied = 0;
        for assignment in assignments {
            match self.steps.iter_mut().find(|s| s.id == assignment.id) {
                Some(step) => {
                    step.reschedule(assignment.date);
                    applied += 1;
                }
                None => warn!(step_id = %assignment.id, "Snapshot::apply: unknown step"),
            }
        }
        debug!(applied, total = assignments.len(), "Snapshot::apply: done");
        applied
    }

    /// Add `plan` as a new goal with its steps, returning the goal's id
    pub fn insert_goal(&mut self, plan: &GoalPlan) -> GoalId {
        let goal_id = self.goals.iter().map(|g| g.id).max().map_or(GoalId(1), GoalId::next);
        let mut step_id = self.steps.iter().map(|s| s.id).max().map_or(StepId(1), StepId::next);

        self.goals.push(Goal::new(goal_id, plan.title.clone()));
        for placed in &plan.steps {
            self.steps.push(
                Step::new(step_id, goal_id, placed.title.clone())
                    .with_description(placed.description.clone())
                    .on(placed.date),
            );
            step_id = step_id.next();
        }

        info!(%goal_id, steps = plan.steps.len(), "Snapshot::insert_goal: inserted");
        goal_id
    }

    /// Steps belonging to `goal`
    pub fn steps_of(&self, goal: GoalId) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(move |s| s.goal_id == goal)
    }
}

/// File-backed snapshot storage
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot; a missing file is an empty snapshot
    pub fn load(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "SnapshotStore::load: no snapshot yet");
            return Ok(Snapshot::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read snapshot {}", self.path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot {}", self.path.display()))?;

        debug!(goals = snapshot.goals.len(), steps = snapshot.steps.len(), "SnapshotStore::load: loaded");
        Ok(snapshot)
    }

    /// Write the snapshot atomically
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).context("Failed to create snapshot directory")?;

        let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).context("Failed to create temp file")?;
        tmp.write_all(json.as_bytes()).context("Failed to write snapshot")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace snapshot {}", self.path.display()))?;

        info!(path = %self.path.display(), "SnapshotStore::save: saved");
        Ok(())
    }
}
