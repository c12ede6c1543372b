use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, put},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{
        activity::{Activity, ActivityUpdate, NewActivity, ScheduledActivity},
        day::TripDay,
    },
    services::{
        feed::ActivityFeed,
        schedule::upcoming_activity,
        trips::{owned_trip, trip_day},
    },
    state::AppState,
    store::queries::{ActivitiesQuery, DaysQuery},
};

use super::{
    live::{feed_sse, subscription_sse},
    trips::TripPath,
};

#[derive(Debug, Deserialize)]
struct DayPath {
    trip_id: String,
    day_id: String,
}

#[derive(Debug, Deserialize)]
struct ActivityPath {
    trip_id: String,
    day_id: String,
    activity_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/days", get(list_days))
        .route("/days/live", get(live_days))
        .route(
            "/days/:day_id/activities",
            get(list_activities).post(create_activity),
        )
        .route("/days/:day_id/activities/live", get(live_activities))
        .route("/days/:day_id/activities/order", put(reorder_activities))
        .route(
            "/days/:day_id/activities/:activity_id",
            patch(update_activity).delete(delete_activity),
        )
        .route("/activities", get(trip_activities))
        .route("/activities/upcoming", get(upcoming))
        .route("/activities/live", get(live_trip_activities))
}

async fn list_days(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<Json<Vec<TripDay>>, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    Ok(Json(state.store.list_days(&trip.id).await?))
}

async fn live_days(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    Ok(subscription_sse(state.store.watch(DaysQuery { trip_id: trip.id })))
}

async fn list_activities(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<DayPath>,
) -> Result<Json<Vec<Activity>>, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let day = trip_day(&state.store, &trip, &path.day_id).await?;
    Ok(Json(state.store.list_activities(&trip.id, &day.id).await?))
}

async fn live_activities(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<DayPath>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let day = trip_day(&state.store, &trip, &path.day_id).await?;
    Ok(subscription_sse(state.store.watch(ActivitiesQuery {
        trip_id: trip.id,
        day_id: day.id,
    })))
}

async fn create_activity(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<DayPath>,
    Json(form): Json<NewActivity>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let day = trip_day(&state.store, &trip, &path.day_id).await?;
    let fields = form.validate()?;
    let activity = state
        .store
        .create_activity(&trip.id, &day.id, &fields, form.order)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

async fn update_activity(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<ActivityPath>,
    Json(update): Json<ActivityUpdate>,
) -> Result<Json<Activity>, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let activity = state
        .store
        .get_activity(&trip.id, &path.day_id, &path.activity_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let fields = update.apply_to(&activity)?;
    Ok(Json(state.store.update_activity(&activity, &fields).await?))
}

async fn delete_activity(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<ActivityPath>,
) -> Result<StatusCode, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    if state
        .store
        .delete_activity(&trip.id, &path.day_id, &path.activity_id)
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

#[derive(Debug, Deserialize)]
struct ReorderForm {
    ids: Vec<String>,
}

async fn reorder_activities(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<DayPath>,
    Json(form): Json<ReorderForm>,
) -> Result<Json<Vec<Activity>>, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let day = trip_day(&state.store, &trip, &path.day_id).await?;
    let activities = state
        .store
        .reorder_activities(&trip.id, &day.id, &form.ids)
        .await?;
    Ok(Json(activities))
}

async fn trip_activities(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<Json<Vec<ScheduledActivity>>, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    Ok(Json(state.store.list_trip_activities(&trip.id).await?))
}

async fn upcoming(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<Json<Option<ScheduledActivity>>, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let activities = state.store.list_trip_activities(&trip.id).await?;
    let now = Local::now().naive_local();
    Ok(Json(upcoming_activity(&activities, now).cloned()))
}

async fn live_trip_activities(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    Ok(feed_sse(ActivityFeed::spawn(&state.store, trip.id)))
}
