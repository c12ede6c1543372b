use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::validation::{check_date_range, require_text, ValidationError};

use super::{currency::Currency, parse_column};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub title: String,
    pub destination: String,
    pub lat: f64,
    pub lng: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_budget: f64,
    pub currency: Currency,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// `(0, 0)` is what the forms submit when no place was picked.
    pub fn has_location(&self) -> bool {
        !(self.lat == 0.0 && self.lng == 0.0)
    }

    pub fn fields(&self) -> TripFields {
        TripFields {
            title: self.title.clone(),
            destination: self.destination.clone(),
            lat: self.lat,
            lng: self.lng,
            start_date: self.start_date,
            end_date: self.end_date,
            total_budget: self.total_budget,
            currency: self.currency,
        }
    }
}

impl<'r> FromRow<'r, SqliteRow> for Trip {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            destination: row.try_get("destination")?,
            lat: row.try_get("lat")?,
            lng: row.try_get("lng")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            total_budget: row.try_get("total_budget")?,
            currency: parse_column(row, "currency")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// The user-editable part of a trip, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct TripFields {
    pub title: String,
    pub destination: String,
    pub lat: f64,
    pub lng: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_budget: f64,
    pub currency: Currency,
}

impl TripFields {
    fn validated(self) -> Result<Self, ValidationError> {
        let title = require_text(&self.title, "Trip name")?;
        let destination = require_text(&self.destination, "Destination")?;
        let (start_date, end_date) = check_date_range(Some(self.start_date), Some(self.end_date))?;
        if self.total_budget < 0.0 || !self.total_budget.is_finite() {
            return Err(ValidationError::NegativeBudget);
        }
        Ok(Self {
            title,
            destination,
            start_date,
            end_date,
            ..self
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTrip {
    pub title: String,
    pub destination: String,
    pub lat: f64,
    pub lng: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_budget: f64,
    pub currency: Option<String>,
}

impl NewTrip {
    /// Validates the form; trips without an explicit currency use `fallback`.
    pub fn validate(&self, fallback: Currency) -> Result<TripFields, ValidationError> {
        let (start_date, end_date) = check_date_range(self.start_date, self.end_date)?;
        let currency = match self.currency.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Currency::parse_input(raw)?,
            _ => fallback,
        };
        TripFields {
            title: self.title.clone(),
            destination: self.destination.clone(),
            lat: self.lat,
            lng: self.lng,
            start_date,
            end_date,
            total_budget: self.total_budget,
            currency,
        }
        .validated()
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripUpdate {
    pub title: Option<String>,
    pub destination: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_budget: Option<f64>,
    pub currency: Option<String>,
}

impl TripUpdate {
    pub fn apply_to(&self, trip: &Trip) -> Result<TripFields, ValidationError> {
        let current = trip.fields();
        let currency = match self.currency.as_deref() {
            Some(raw) => Currency::parse_input(raw)?,
            None => current.currency,
        };
        TripFields {
            title: self.title.clone().unwrap_or(current.title),
            destination: self.destination.clone().unwrap_or(current.destination),
            lat: self.lat.unwrap_or(current.lat),
            lng: self.lng.unwrap_or(current.lng),
            start_date: self.start_date.unwrap_or(current.start_date),
            end_date: self.end_date.unwrap_or(current.end_date),
            total_budget: self.total_budget.unwrap_or(current.total_budget),
            currency,
        }
        .validated()
    }
}
