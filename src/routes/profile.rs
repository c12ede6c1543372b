use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{
        currency::{currency_options, Currency, CurrencyOption},
        user::UserProfile,
    },
    state::AppState,
    store::queries::ProfileQuery,
};

use super::live::subscription_sse;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/me/live", get(live_profile))
        .route("/me/currency", put(set_currency))
        .route("/currencies", get(currencies))
}

async fn me(current: CurrentUser) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(current.require_user()?.profile()))
}

async fn live_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    Ok(subscription_sse(state.store.watch(ProfileQuery {
        user_uuid: user.uuid.clone(),
    })))
}

#[derive(Deserialize)]
struct CurrencyForm {
    currency: String,
}

async fn set_currency(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(form): Json<CurrencyForm>,
) -> Result<Json<UserProfile>, AppError> {
    let user = current.require_user()?;
    let currency = Currency::parse_input(&form.currency)?;
    state.store.set_default_currency(&user.uuid, currency).await?;

    let mut profile = user.profile();
    profile.default_currency = currency;
    Ok(Json(profile))
}

async fn currencies(current: CurrentUser) -> Result<Json<Vec<CurrencyOption>>, AppError> {
    current.require_user()?;
    Ok(Json(currency_options()))
}
