//! Keeping a trip's days in step with its date range.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::models::day::{calendar_days, DayPlan, NewDay, TripDay};

/// Diffs `existing` against the inclusive range `start..=end`.
///
/// Days outside the range are removed. Dates in the range without a day are
/// added, numbered after the highest existing day number; retained days keep
/// their numbers.
pub fn plan_day_reconciliation(existing: &[TripDay], start: NaiveDate, end: NaiveDate) -> DayPlan {
    let wanted: BTreeSet<NaiveDate> = calendar_days(start, end).collect();
    let present: HashSet<NaiveDate> = existing.iter().map(|day| day.date).collect();

    let remove = existing
        .iter()
        .filter(|day| !wanted.contains(&day.date))
        .cloned()
        .collect();

    let mut next_number = existing.iter().map(|day| day.day_number).max().unwrap_or(0) + 1;
    let add = wanted
        .into_iter()
        .filter(|date| !present.contains(date))
        .map(|date| {
            let day = NewDay {
                date,
                day_number: next_number,
            };
            next_number += 1;
            day
        })
        .collect();

    DayPlan { remove, add }
}

/// Whole days from `today` until `date`; negative once `date` has passed.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}
