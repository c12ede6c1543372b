use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::validation::{require_text, ValidationError};

use super::{parse_column, text_enum};

text_enum! {
    PackingCategory as "packing category" {
        Documents,
        Clothes,
        Footwear,
        Toiletries,
        Health,
        Electronics,
        Accessories,
        Other,
    }
}

impl Default for PackingCategory {
    fn default() -> Self {
        PackingCategory::Other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingItem {
    pub id: String,
    pub trip_id: String,
    pub name: String,
    pub category: PackingCategory,
    pub packed: bool,
}

impl<'r> FromRow<'r, SqliteRow> for PackingItem {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            trip_id: row.try_get("trip_id")?,
            name: row.try_get("name")?,
            category: parse_column(row, "category")?,
            packed: row.try_get("packed")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPackingItem {
    pub name: String,
    pub category: PackingCategory,
}

impl NewPackingItem {
    pub fn validate(&self) -> Result<(String, PackingCategory), ValidationError> {
        Ok((require_text(&self.name, "Item name")?, self.category))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackingItemUpdate {
    pub name: Option<String>,
    pub category: Option<PackingCategory>,
    pub packed: Option<bool>,
}

impl PackingItemUpdate {
    pub fn apply_to(&self, item: &PackingItem) -> Result<PackingItem, ValidationError> {
        let name = match &self.name {
            Some(name) => require_text(name, "Item name")?,
            None => item.name.clone(),
        };
        Ok(PackingItem {
            name,
            category: self.category.unwrap_or(item.category),
            packed: self.packed.unwrap_or(item.packed),
            ..item.clone()
        })
    }
}
