use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::validation::{check_time, check_time_window, require_text, ValidationError};

use super::{parse_column, text_enum};

text_enum! {
    ActivityCategory as "activity category" { Food, Transport, Attraction, Hotel }
}

impl Default for ActivityCategory {
    fn default() -> Self {
        ActivityCategory::Attraction
    }
}

impl ActivityCategory {
    pub fn icon(&self) -> &'static str {
        match self {
            ActivityCategory::Food => "restaurant",
            ActivityCategory::Transport => "directions_car",
            ActivityCategory::Attraction => "museum",
            ActivityCategory::Hotel => "hotel",
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub trip_id: String,
    pub day_id: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub category: ActivityCategory,
    pub notes: String,
    pub estimated_cost: f64,
    pub order: i64,
}

impl<'r> FromRow<'r, SqliteRow> for Activity {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            trip_id: row.try_get("trip_id")?,
            day_id: row.try_get("day_id")?,
            name: row.try_get("name")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            location: row.try_get("location")?,
            lat: row.try_get("lat")?,
            lng: row.try_get("lng")?,
            category: parse_column(row, "category")?,
            notes: row.try_get("notes")?,
            estimated_cost: row.try_get("estimated_cost")?,
            order: row.try_get("sort_order")?,
        })
    }
}

/// An activity together with the day it belongs to, as shown in trip-wide lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledActivity {
    #[serde(flatten)]
    pub activity: Activity,
    pub date: NaiveDate,
    pub day_number: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityFields {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub category: ActivityCategory,
    pub notes: String,
    pub estimated_cost: f64,
}

impl ActivityFields {
    fn validated(self) -> Result<Self, ValidationError> {
        let name = require_text(&self.name, "Activity name")?;
        let start_time = check_time(&self.start_time, "Start time")?;
        let end_time = check_time(&self.end_time, "End time")?;
        check_time_window(&start_time, &end_time)?;
        if self.estimated_cost < 0.0 || !self.estimated_cost.is_finite() {
            return Err(ValidationError::NegativeCost);
        }
        Ok(Self {
            name,
            start_time,
            end_time,
            location: self.location.trim().to_string(),
            notes: self.notes.trim().to_string(),
            ..self
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewActivity {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub category: ActivityCategory,
    pub notes: String,
    pub estimated_cost: f64,
    /// Appended after the day's existing activities when absent.
    pub order: Option<i64>,
}

impl NewActivity {
    pub fn validate(&self) -> Result<ActivityFields, ValidationError> {
        ActivityFields {
            name: self.name.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            location: self.location.clone(),
            lat: self.lat,
            lng: self.lng,
            category: self.category,
            notes: self.notes.clone(),
            estimated_cost: self.estimated_cost,
        }
        .validated()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityUpdate {
    pub name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    /// `null` clears the coordinate, absence keeps it.
    #[serde(with = "serde_with::rust::double_option")]
    pub lat: Option<Option<f64>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub lng: Option<Option<f64>>,
    pub category: Option<ActivityCategory>,
    pub notes: Option<String>,
    pub estimated_cost: Option<f64>,
}

impl ActivityUpdate {
    pub fn apply_to(&self, activity: &Activity) -> Result<ActivityFields, ValidationError> {
        ActivityFields {
            name: self.name.clone().unwrap_or_else(|| activity.name.clone()),
            start_time: self
                .start_time
                .clone()
                .unwrap_or_else(|| activity.start_time.clone()),
            end_time: self
                .end_time
                .clone()
                .unwrap_or_else(|| activity.end_time.clone()),
            location: self
                .location
                .clone()
                .unwrap_or_else(|| activity.location.clone()),
            lat: self.lat.unwrap_or(activity.lat),
            lng: self.lng.unwrap_or(activity.lng),
            category: self.category.unwrap_or(activity.category),
            notes: self.notes.clone().unwrap_or_else(|| activity.notes.clone()),
            estimated_cost: self.estimated_cost.unwrap_or(activity.estimated_cost),
        }
        .validated()
    }
}
