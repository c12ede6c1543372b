pub mod auth;
pub mod itinerary;
pub mod live;
pub mod money;
pub mod packing;
pub mod profile;
pub mod rates;
pub mod trips;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router())
        .merge(profile::router())
        .nest("/trips", trips::router())
        .nest("/trips/:trip_id", trip_scoped())
        .nest("/rates", rates::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn trip_scoped() -> Router<AppState> {
    Router::new()
        .merge(itinerary::router())
        .merge(money::router())
        .merge(packing::router())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
