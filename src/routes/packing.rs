use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::packing::{NewPackingItem, PackingItem, PackingItemUpdate},
    services::{packing::packed_count, trips::owned_trip},
    state::AppState,
    store::queries::PackingQuery,
};

use super::{live::subscription_sse, trips::TripPath};

#[derive(Debug, Deserialize)]
struct ItemPath {
    trip_id: String,
    item_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/packing", get(list_items).post(create_item))
        .route("/packing/live", get(live_items))
        .route("/packing/:item_id", patch(update_item).delete(delete_item))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackingList {
    items: Vec<PackingItem>,
    packed: usize,
    total: usize,
}

async fn list_items(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<Json<PackingList>, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let items = state.store.list_packing_items(&trip.id).await?;
    Ok(Json(PackingList {
        packed: packed_count(&items),
        total: items.len(),
        items,
    }))
}

async fn live_items(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    Ok(subscription_sse(
        state.store.watch(PackingQuery { trip_id: trip.id }),
    ))
}

async fn create_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
    Json(form): Json<NewPackingItem>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let (name, category) = form.validate()?;
    let item = state
        .store
        .create_packing_item(&trip.id, &name, category)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<ItemPath>,
    Json(update): Json<PackingItemUpdate>,
) -> Result<Json<PackingItem>, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let item = state
        .store
        .get_packing_item(&trip.id, &path.item_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let updated = update.apply_to(&item)?;
    Ok(Json(state.store.update_packing_item(&updated).await?))
}

async fn delete_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<ItemPath>,
) -> Result<StatusCode, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    if state.store.delete_packing_item(&trip.id, &path.item_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
