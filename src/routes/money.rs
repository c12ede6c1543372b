use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::expense::{Expense, ExpenseUpdate, NewExpense},
    services::{budget::BudgetSummary, trips::owned_trip},
    state::AppState,
    store::queries::ExpensesQuery,
};

use super::{live::subscription_sse, trips::TripPath};

#[derive(Debug, Deserialize)]
struct ExpensePath {
    trip_id: String,
    expense_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/live", get(live_expenses))
        .route(
            "/expenses/:expense_id",
            patch(update_expense).delete(delete_expense),
        )
        .route("/budget", get(budget))
}

async fn list_expenses(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<Json<Vec<Expense>>, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    Ok(Json(state.store.list_expenses(&trip.id).await?))
}

async fn live_expenses(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    Ok(subscription_sse(
        state.store.watch(ExpensesQuery { trip_id: trip.id }),
    ))
}

async fn create_expense(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
    Json(form): Json<NewExpense>,
) -> Result<impl IntoResponse, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let fields = form.validate(&trip, Local::now().date_naive())?;
    let expense = state.store.create_expense(&trip.id, &fields).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn update_expense(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<ExpensePath>,
    Json(update): Json<ExpenseUpdate>,
) -> Result<Json<Expense>, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let expense = state
        .store
        .get_expense(&trip.id, &path.expense_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let fields = update.apply_to(&expense, &trip)?;
    Ok(Json(state.store.update_expense(&expense, &fields).await?))
}

async fn delete_expense(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<ExpensePath>,
) -> Result<StatusCode, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    if state.store.delete_expense(&trip.id, &path.expense_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn budget(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(path): Path<TripPath>,
) -> Result<Json<BudgetSummary>, AppError> {
    let user = current.require_user()?;
    let trip = owned_trip(&state.store, &user.uuid, &path.trip_id).await?;
    let expenses = state.store.list_expenses(&trip.id).await?;
    Ok(Json(BudgetSummary::compute(trip.total_budget, &expenses)))
}
