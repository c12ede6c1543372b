use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TripDay {
    pub id: String,
    pub trip_id: String,
    pub date: NaiveDate,
    pub day_number: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDay {
    pub date: NaiveDate,
    pub day_number: i64,
}

/// What has to change so a trip's days match its date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    /// Days outside the range; their activities go with them.
    pub remove: Vec<TripDay>,
    pub add: Vec<NewDay>,
}

impl DayPlan {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }
}

/// Every calendar date from `start` through `end`, inclusive.
pub fn calendar_days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |date| *date <= end)
}
