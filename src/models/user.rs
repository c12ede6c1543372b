use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::currency::Currency;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub uuid: String,
    pub display_name: String,
    pub email: String,
    pub password_hash: String,
    pub default_currency: String,
    pub last_trip_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Unknown stored codes fall back to USD rather than failing the request.
    pub fn default_currency(&self) -> Currency {
        self.default_currency.parse().unwrap_or_default()
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            uuid: self.uuid.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            default_currency: self.default_currency(),
            last_trip_id: self.last_trip_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uuid: String,
    pub display_name: String,
    pub email: String,
    pub default_currency: Currency,
    pub last_trip_id: Option<String>,
}
