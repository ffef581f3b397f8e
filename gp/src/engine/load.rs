//! Calendar load index
//!
//! Maps each calendar day to the number of dated steps on it. Days without
//! steps are absent rather than stored as zero, and undated steps are
//! ignored. The index is rebuilt from the snapshot on every request.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Step, StepId};

/// Per-day step counts for one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayLoad {
    counts: BTreeMap<NaiveDate, usize>,
}

/// One row of a day-load listing, as shown to advisory sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLoadEntry {
    pub date: NaiveDate,
    pub tasks_count: usize,
}

/// Build the load index over all of a user's steps
pub fn build_load_index<'a>(steps: impl IntoIterator<Item = &'a Step>) -> DayLoad {
    DayLoad::build_excluding(steps, None)
}

impl DayLoad {
    /// Build the index, optionally leaving out the step being moved
    pub fn build_excluding<'a>(steps: impl IntoIterator<Item = &'a Step>, exclude: Option<StepId>) -> Self {
        let mut load = Self::default();
        for step in steps {
            if Some(step.id) == exclude {
                continue;
            }
            if let Some(day) = step.day() {
                load.add(day);
            }
        }
        debug!(days = load.counts.len(), total = load.total(), "DayLoad::build_excluding: built");
        load
    }

    /// Number of steps on `day` (zero if absent)
    pub fn get(&self, day: NaiveDate) -> usize {
        self.counts.get(&day).copied().unwrap_or(0)
    }

    /// Record one more step on `day`
    pub fn add(&mut self, day: NaiveDate) {
        *self.counts.entry(day).or_insert(0) += 1;
    }

    /// Sum of all counts; equals the number of dated steps indexed
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct occupied days
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when no step has a date
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Occupied days in ascending order with their counts
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, usize)> + '_ {
        self.counts.iter().map(|(d, c)| (*d, *c))
    }

    /// Every day with at least one step
    pub fn occupied_dates(&self) -> BTreeSet<NaiveDate> {
        self.counts.keys().copied().collect()
    }

    /// Listing sorted by date, starting at `from` when given
    pub fn entries(&self, from: Option<NaiveDate>) -> Vec<DayLoadEntry> {
        self.iter()
            .filter(|(date, _)| from.is_none_or(|f| *date >= f))
            .map(|(date, tasks_count)| DayLoadEntry { date, tasks_count })
            .collect()
    }
}
