use chrono::{DateTime, Utc};

use crate::{
    auth::AuthFailure,
    error::AppError,
    models::{currency::Currency, session::Session, user::User},
};

use super::{Change, Store};

const USER_COLUMNS: &str = "id, uuid, display_name, email, password_hash, default_currency, last_trip_id, created_at, last_login_at";

impl Store {
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
        ))
        .bind(email)
        .fetch_optional(self.db())
        .await?;
        Ok(user)
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.db())
            .await?;
        Ok(user)
    }

    pub async fn find_user_by_uuid(&self, uuid: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE uuid = ?"))
            .bind(uuid)
            .fetch_optional(self.db())
            .await?;
        Ok(user)
    }

    pub async fn insert_user(
        &self,
        uuid: &str,
        display_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let now = Utc::now();
        let id = sqlx::query(
            r#"INSERT INTO users (uuid, display_name, email, password_hash, default_currency, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(uuid)
        .bind(display_name)
        .bind(email)
        .bind(password_hash)
        .bind(Currency::default().as_str())
        .bind(now)
        .execute(self.db())
        .await
        .map_err(|err| match &err {
            // A concurrent sign-up with the same address won the insert.
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::from(AuthFailure::EmailInUse)
            }
            _ => AppError::from(err),
        })?
        .last_insert_rowid();
        self.find_user_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn set_default_currency(&self, uuid: &str, currency: Currency) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET default_currency = ? WHERE uuid = ?")
            .bind(currency.as_str())
            .bind(uuid)
            .execute(self.db())
            .await?;
        self.publish([Change::Profile {
            user_uuid: uuid.to_string(),
        }]);
        Ok(())
    }

    pub async fn set_last_trip(&self, uuid: &str, trip_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_trip_id = ? WHERE uuid = ?")
            .bind(trip_id)
            .bind(uuid)
            .execute(self.db())
            .await?;
        self.publish([Change::Profile {
            user_uuid: uuid.to_string(),
        }]);
        Ok(())
    }

    pub async fn touch_login(&self, user_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(user_id)
            .execute(self.db())
            .await?;
        Ok(())
    }

    pub async fn insert_session(
        &self,
        session_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO sessions (id, user_id, created_at, last_seen_at, expires_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .bind(expires_at)
        .execute(self.db())
        .await?;
        Ok(())
    }

    pub async fn find_session(&self, session_id: &str) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, created_at, last_seen_at, expires_at FROM sessions WHERE id = ?",
        )
        .bind(session_id)
        .fetch_optional(self.db())
        .await?;
        Ok(session)
    }

    pub async fn touch_session(&self, session_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE sessions SET last_seen_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(session_id)
            .execute(self.db())
            .await?;
        Ok(())
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id)
            .execute(self.db())
            .await?;
        Ok(())
    }
}
