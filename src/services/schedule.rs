//! Picking the next thing on the itinerary.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::{models::activity::ScheduledActivity, validation::minutes_of_day};

pub trait Scheduled {
    fn date(&self) -> NaiveDate;
    fn start_time(&self) -> &str;
}

impl Scheduled for ScheduledActivity {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn start_time(&self) -> &str {
        &self.activity.start_time
    }
}

/// Empty or malformed start times count as midnight.
fn start_minutes<T: Scheduled>(item: &T) -> u32 {
    minutes_of_day(item.start_time()).unwrap_or(0)
}

/// The first item at or after `now`, or the chronologically first item when
/// everything is already in the past.
pub fn upcoming_activity<T: Scheduled>(items: &[T], now: NaiveDateTime) -> Option<&T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by_key(|item| (item.date(), start_minutes(*item)));

    let today = now.date();
    let now_minutes = now.hour() * 60 + now.minute();

    sorted
        .iter()
        .copied()
        .find(|item| match item.date().cmp(&today) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => start_minutes(*item) >= now_minutes,
            std::cmp::Ordering::Less => false,
        })
        .or_else(|| sorted.first().copied())
}
