use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::validation::{normalize_optional, ValidationError};

use super::{parse_column, text_enum, trip::Trip};

text_enum! {
    ExpenseCategory as "expense category" {
        Food,
        Transport,
        Accommodation,
        Activities,
        Shopping,
        Other,
    }
}

impl Default for ExpenseCategory {
    fn default() -> Self {
        ExpenseCategory::Food
    }
}

impl ExpenseCategory {
    pub fn icon(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "restaurant",
            ExpenseCategory::Transport => "directions_car",
            ExpenseCategory::Accommodation => "hotel",
            ExpenseCategory::Activities => "attractions",
            ExpenseCategory::Shopping => "shopping_bag",
            ExpenseCategory::Other => "category",
        }
    }
}

const UNTITLED: &str = "Untitled expense";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub trip_id: String,
    pub title: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
}

impl<'r> FromRow<'r, SqliteRow> for Expense {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            trip_id: row.try_get("trip_id")?,
            title: row.try_get("title")?,
            amount: row.try_get("amount")?,
            category: parse_column(row, "category")?,
            date: row.try_get("date")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFields {
    pub title: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
}

impl ExpenseFields {
    fn validated(self, trip: &Trip) -> Result<Self, ValidationError> {
        if !(self.amount > 0.0 && self.amount.is_finite()) {
            return Err(ValidationError::NonPositiveAmount);
        }
        if !trip.contains(self.date) {
            return Err(ValidationError::OutsideTrip {
                start: trip.start_date,
                end: trip.end_date,
            });
        }
        let title = normalize_optional(Some(self.title)).unwrap_or_else(|| UNTITLED.to_string());
        Ok(Self { title, ..self })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    /// Defaults to `today` when omitted.
    pub date: Option<NaiveDate>,
}

impl NewExpense {
    pub fn validate(&self, trip: &Trip, today: NaiveDate) -> Result<ExpenseFields, ValidationError> {
        ExpenseFields {
            title: self.title.clone(),
            amount: self.amount,
            category: self.category,
            date: self.date.unwrap_or(today),
        }
        .validated(trip)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpenseUpdate {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<ExpenseCategory>,
    pub date: Option<NaiveDate>,
}

impl ExpenseUpdate {
    pub fn apply_to(&self, expense: &Expense, trip: &Trip) -> Result<ExpenseFields, ValidationError> {
        ExpenseFields {
            title: self.title.clone().unwrap_or_else(|| expense.title.clone()),
            amount: self.amount.unwrap_or(expense.amount),
            category: self.category.unwrap_or(expense.category),
            date: self.date.unwrap_or(expense.date),
        }
        .validated(trip)
    }
}
