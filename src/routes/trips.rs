use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{
        day::TripDay,
        trip::{NewTrip, Trip, TripUpdate},
    },
    services::{
        trips::{self as trip_service, TripOverview},
        weather::Forecast,
    },
    state::AppState,
    store::queries::{TripQuery, TripsQuery},
};

use super::live::subscription_sse;

#[derive(Debug, Deserialize)]
pub struct TripPath {
    pub trip_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route("/live", get(live_trips))
        .route(
            "/:trip_id",
            get(show_trip).patch(update_trip).delete(delete_trip),
        )
        .route("/:trip_id/live", get(live_trip))
        .route("/:trip_id/overview", get(overview))
        .route("/:trip_id/weather", get(weather))
}

async fn list_trips(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<Trip>>, AppError> {
    let user = current.require_user()?;
    Ok(Json(state.store.list_trips(&user.uuid).await?))
}

async fn live_trips(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let subscription = state.store.watch(TripsQuery {
        owner: user.uuid.clone(),
    });
    Ok(subscription_sse(subscription))
}

#[derive(Serialize)]
struct CreatedTrip {
    trip: Trip,
    days: Vec<TripDay>,
}

async fn create_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(form): Json<NewTrip>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let (trip, days) = trip_service::create_trip(&state.store, user, &form).await?;
    Ok((StatusCode::CREATED, Json(CreatedTrip { trip, days })))
}

async fn show_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<Json<Trip>, AppError> {
    let user = current.require_user()?;
    let trip = trip_service::owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    Ok(Json(trip))
}

async fn live_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let trip = trip_service::owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    Ok(subscription_sse(state.store.watch(TripQuery { trip_id: trip.id })))
}

async fn update_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
    Json(update): Json<TripUpdate>,
) -> Result<Json<Trip>, AppError> {
    let user = current.require_user()?;
    let trip = trip_service::owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let updated = trip_service::update_trip(&state.store, &trip, &update).await?;
    Ok(Json(updated))
}

async fn delete_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<StatusCode, AppError> {
    let user = current.require_user()?;
    let trip = trip_service::owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    trip_service::delete_trip(&state.store, &trip).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn overview(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<Json<TripOverview>, AppError> {
    let user = current.require_user()?;
    let trip = trip_service::owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let overview = trip_service::trip_overview(&state.store, user, trip).await?;
    Ok(Json(overview))
}

/// `null` when the trip has no coordinates.
async fn weather(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<Json<Option<Forecast>>, AppError> {
    let user = current.require_user()?;
    let trip = trip_service::owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let forecast = state.weather.forecast(trip.lat, trip.lng).await?;
    Ok(Json(forecast))
}
