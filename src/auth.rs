//! Email/password accounts and cookie sessions.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    error::AppError,
    models::user::User,
    state::AppState,
    store::new_id,
    validation::require_text,
};

pub const SESSION_COOKIE: &str = "itinera_session";
pub const MIN_PASSWORD_LEN: usize = 6;
const SESSION_TTL_DAYS: i64 = 30;

/// Sign-in and sign-up failures, worded for the person at the keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("Incorrect email or password.")]
    InvalidCredentials,
    #[error("An account with this email already exists.")]
    EmailInUse,
    #[error("Password should be at least 6 characters.")]
    WeakPassword,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

impl AuthFailure {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthFailure::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthFailure::EmailInUse => StatusCode::CONFLICT,
            AuthFailure::WeakPassword | AuthFailure::InvalidEmail => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::Other(anyhow::anyhow!("password hashing failed: {err}")))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a wrong password; `Err` only when the stored hash is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| AppError::Other(anyhow::anyhow!("stored password hash is invalid: {err}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(AppError::Other(anyhow::anyhow!(
            "password verification failed: {err}"
        ))),
    }
}

/// Trims and lowercases; rejects anything without a local part and a dotted domain.
pub fn normalize_email(raw: &str) -> Result<String, AuthFailure> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(AuthFailure::InvalidEmail)
    }
}

pub async fn register_user(
    state: &AppState,
    display_name: &str,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let display_name = require_text(display_name, "Name")?;
    let email = normalize_email(email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthFailure::WeakPassword.into());
    }
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AuthFailure::EmailInUse.into());
    }

    let hash = hash_password(password)?;
    let user = state
        .store
        .insert_user(&new_id(), &display_name, &email, &hash)
        .await?;
    info!(user = %user.uuid, "user registered");
    Ok(user)
}

pub async fn authenticate_user(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let email = email.trim().to_lowercase();
    let Some(user) = state.store.find_user_by_email(&email).await? else {
        return Err(AuthFailure::InvalidCredentials.into());
    };
    if !verify_password(password, &user.password_hash)? {
        warn!(user = %user.uuid, "failed login");
        return Err(AuthFailure::InvalidCredentials.into());
    }
    state.store.touch_login(user.id).await?;
    Ok(user)
}

pub async fn create_session(state: &AppState, user_id: i64) -> Result<String, AppError> {
    let session_id = new_id();
    let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
    state
        .store
        .insert_session(&session_id, user_id, expires_at)
        .await?;
    Ok(session_id)
}

pub async fn destroy_session(state: &AppState, session_id: &str) -> Result<(), AppError> {
    state.store.delete_session(session_id).await
}

pub fn apply_session_cookie(jar: PrivateCookieJar, session_id: &str) -> PrivateCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

pub fn clear_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/").build())
}

/// The signed-in user, if the request carries a live session cookie.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Self(None));
        };

        let Some(session) = state.store.find_session(cookie.value()).await? else {
            return Ok(Self(None));
        };
        if session.is_expired(Utc::now()) {
            state.store.delete_session(&session.id).await?;
            return Ok(Self(None));
        }

        let user = state.store.find_user_by_id(session.user_id).await?;
        if user.is_some() {
            state.store.touch_session(&session.id).await?;
        }
        Ok(Self(user))
    }
}

impl CurrentUser {
    pub fn require_user(&self) -> Result<&User, AppError> {
        self.0.as_ref().ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_and_reject() {
        let hash = hash_password("kyoto-2025").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("kyoto-2025", &hash).unwrap());
        assert!(!verify_password("osaka-2025", &hash).unwrap());
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Ana@Example.COM ").unwrap(), "ana@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for raw in ["", "ana", "ana@", "@example.com", "ana@example", "a b@example.com"] {
            assert_eq!(normalize_email(raw), Err(AuthFailure::InvalidEmail), "{raw}");
        }
    }

    #[test]
    fn failures_map_to_statuses() {
        assert_eq!(AuthFailure::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthFailure::EmailInUse.status(), StatusCode::CONFLICT);
        assert_eq!(AuthFailure::WeakPassword.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
