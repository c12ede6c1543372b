use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::currency::Currency,
    services::rates::ExchangeRates,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/convert", get(convert))
        .route("/:base", get(rates))
        .route("/:base/refresh", post(refresh))
}

async fn rates(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(base): Path<String>,
) -> Result<Json<ExchangeRates>, AppError> {
    current.require_user()?;
    let base = Currency::parse_input(&base)?;
    Ok(Json(state.rates.rates(base).await?))
}

async fn refresh(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(base): Path<String>,
) -> Result<Json<ExchangeRates>, AppError> {
    current.require_user()?;
    let base = Currency::parse_input(&base)?;
    Ok(Json(state.rates.refresh(base).await?))
}

#[derive(Debug, Deserialize)]
struct ConvertQuery {
    amount: f64,
    from: String,
    to: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Conversion {
    amount: f64,
    from: Currency,
    to: Currency,
    /// `null` when no rate is known for one of the currencies.
    converted: Option<f64>,
}

async fn convert(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<Conversion>, AppError> {
    current.require_user()?;
    let from = Currency::parse_input(&query.from)?;
    let to = Currency::parse_input(&query.to)?;
    let converted = state.rates.convert(query.amount, from, to).await?;
    Ok(Json(Conversion {
        amount: query.amount,
        from,
        to,
        converted,
    }))
}
