//! Slot finder
//!
//! Both searches walk forward one day at a time from the starting date.
//! They always terminate: the walk is monotonic and only finitely many days
//! can be occupied or loaded. The walk stops at `NaiveDate::MAX`; if that day
//! is taken too it is returned anyway, with a warning.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::load::DayLoad;

/// Earliest day on or after `start` whose load is strictly below `max_per_day`
///
/// A cap of zero could never be satisfied, so it is treated as one. Returns
/// `NaiveDate::MAX` even when full if every later day is full.
pub fn find_date_with_min_load(index: &DayLoad, start: NaiveDate, max_per_day: usize) -> NaiveDate {
    let cap = if max_per_day == 0 {
        warn!("find_date_with_min_load: max_per_day is 0, using 1");
        1
    } else {
        max_per_day
    };

    let mut candidate = start;
    while index.get(candidate) >= cap {
        match candidate.succ_opt() {
            Some(next) => candidate = next,
            None => {
                warn!(%start, %candidate, cap, "find_date_with_min_load: ran out of dates, returning a full day");
                break;
            }
        }
    }

    debug!(%start, %candidate, cap, "find_date_with_min_load: resolved");
    candidate
}

/// Earliest day on or after `start` that is not in `busy_dates`
///
/// Returns `NaiveDate::MAX` even when busy if every later day is busy.
pub fn find_next_free_date(busy_dates: &BTreeSet<NaiveDate>, start: NaiveDate) -> NaiveDate {
    let mut candidate = start;

    // Busy days come back sorted, so the first gap in the run starting at
    // `start` is the answer.
    for &taken in busy_dates.range(start..) {
        if taken != candidate {
            break;
        }
        match candidate.succ_opt() {
            Some(next) => candidate = next,
            None => {
                warn!(%start, %candidate, "find_next_free_date: ran out of dates, returning a busy day");
                break;
            }
        }
    }

    debug!(%start, %candidate, "find_next_free_date: resolved");
    candidate
}
