//! Trip lifecycle on top of the store: ownership checks, day seeding and
//! reconciliation, and the combined overview read.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::info;

use crate::{
    error::AppError,
    models::{
        activity::ScheduledActivity,
        day::{DayPlan, TripDay},
        expense::Expense,
        packing::PackingItem,
        trip::{NewTrip, Trip, TripUpdate},
        user::User,
    },
    store::Store,
};

use super::{
    budget::BudgetSummary,
    itinerary::{days_until, plan_day_reconciliation},
    packing::{packed_count, DEFAULT_PACKING_ITEMS},
    schedule::upcoming_activity,
};

/// Loads a trip and checks that `owner` created it.
pub async fn owned_trip(store: &Store, owner: &str, trip_id: &str) -> Result<Trip, AppError> {
    let trip = store.get_trip(trip_id).await?.ok_or(AppError::NotFound)?;
    if trip.created_by != owner {
        return Err(AppError::Forbidden);
    }
    Ok(trip)
}

/// Loads a day and checks that it belongs to `trip`.
pub async fn trip_day(store: &Store, trip: &Trip, day_id: &str) -> Result<TripDay, AppError> {
    store
        .get_day(&trip.id, day_id)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn create_trip(
    store: &Store,
    user: &User,
    form: &NewTrip,
) -> Result<(Trip, Vec<TripDay>), AppError> {
    let fields = form.validate(user.default_currency())?;
    let plan = plan_day_reconciliation(&[], fields.start_date, fields.end_date);
    let (trip, days) = store
        .create_trip(&user.uuid, &fields, &plan, DEFAULT_PACKING_ITEMS)
        .await?;
    info!(trip_id = %trip.id, owner = %user.uuid, days = days.len(), "trip created");
    Ok((trip, days))
}

/// Applies `update` to the trip as currently stored; days are reconciled
/// only when the range moved.
pub async fn update_trip(store: &Store, trip: &Trip, update: &TripUpdate) -> Result<Trip, AppError> {
    let (updated, plan) = store
        .update_trip(&trip.id, |current, days| {
            let fields = update.apply_to(current)?;
            let range_moved =
                fields.start_date != current.start_date || fields.end_date != current.end_date;
            let plan = if range_moved {
                plan_day_reconciliation(days, fields.start_date, fields.end_date)
            } else {
                DayPlan::default()
            };
            Ok((fields, plan))
        })
        .await?;

    if !plan.is_empty() {
        info!(
            trip_id = %updated.id,
            removed = plan.remove.len(),
            added = plan.add.len(),
            "trip days reconciled"
        );
    }
    Ok(updated)
}

pub async fn delete_trip(store: &Store, trip: &Trip) -> Result<(), AppError> {
    store.delete_trip(trip).await?;
    info!(trip_id = %trip.id, "trip deleted");
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripOverview {
    pub trip: Trip,
    pub days: Vec<TripDay>,
    pub total_spent: f64,
    pub remaining: f64,
    pub days_until_start: i64,
    pub upcoming: Option<ScheduledActivity>,
    pub packed: usize,
    pub packing_total: usize,
}

/// Everything the trip dashboard shows, read in one go. Opening a trip also
/// remembers it as the user's last trip.
pub async fn trip_overview(store: &Store, user: &User, trip: Trip) -> Result<TripOverview, AppError> {
    let now = Local::now().naive_local();
    let (days, activities, expenses, packing) = tokio::try_join!(
        store.list_days(&trip.id),
        store.list_trip_activities(&trip.id),
        store.list_expenses(&trip.id),
        store.list_packing_items(&trip.id),
    )?;
    store.set_last_trip(&user.uuid, &trip.id).await?;

    Ok(build_overview(trip, days, &activities, &expenses, &packing, now))
}

fn build_overview(
    trip: Trip,
    days: Vec<TripDay>,
    activities: &[ScheduledActivity],
    expenses: &[Expense],
    packing: &[PackingItem],
    now: NaiveDateTime,
) -> TripOverview {
    let budget = BudgetSummary::compute(trip.total_budget, expenses);
    let today = now.date();
    TripOverview {
        days_until_start: days_until(trip.start_date, today),
        upcoming: upcoming_activity(activities, now).cloned(),
        total_spent: budget.total_spent,
        remaining: budget.remaining,
        packed: packed_count(packing),
        packing_total: packing.len(),
        days,
        trip,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::models::{
        activity::{Activity, ActivityCategory},
        currency::Currency,
        expense::ExpenseCategory,
        packing::PackingCategory,
    };

    fn date(raw: &str) -> NaiveDate {
        raw.parse().unwrap()
    }

    fn trip() -> Trip {
        Trip {
            id: "t1".into(),
            title: "Lisbon".into(),
            destination: "Lisbon, Portugal".into(),
            lat: 38.7,
            lng: -9.1,
            start_date: date("2025-06-10"),
            end_date: date("2025-06-12"),
            total_budget: 500.0,
            currency: Currency::EUR,
            created_by: "u1".into(),
            created_at: Utc::now(),
        }
    }

    fn expense(amount: f64) -> Expense {
        Expense {
            id: format!("e{amount}"),
            trip_id: "t1".into(),
            title: "Dinner".into(),
            amount,
            category: ExpenseCategory::Food,
            date: date("2025-06-10"),
        }
    }

    fn packing_item(name: &str, packed: bool) -> PackingItem {
        PackingItem {
            id: name.into(),
            trip_id: "t1".into(),
            name: name.into(),
            category: PackingCategory::Documents,
            packed,
        }
    }

    fn scheduled(name: &str, on: &str, start: &str) -> ScheduledActivity {
        ScheduledActivity {
            activity: Activity {
                id: name.into(),
                trip_id: "t1".into(),
                day_id: "d1".into(),
                name: name.into(),
                start_time: start.into(),
                end_time: String::new(),
                location: String::new(),
                lat: None,
                lng: None,
                category: ActivityCategory::Attraction,
                notes: String::new(),
                estimated_cost: 0.0,
                order: 0,
            },
            date: date(on),
            day_number: 1,
        }
    }

    #[test]
    fn overview_combines_budget_packing_and_countdown() {
        let now = date("2025-06-07").and_hms_opt(9, 0, 0).unwrap();
        let activities = vec![
            scheduled("tram", "2025-06-11", "10:00"),
            scheduled("arrival", "2025-06-10", "14:00"),
        ];
        let overview = build_overview(
            trip(),
            Vec::new(),
            &activities,
            &[expense(120.0), expense(30.0)],
            &[packing_item("Passport", true), packing_item("Adapter", false)],
            now,
        );

        assert_eq!(overview.days_until_start, 3);
        assert_eq!(overview.total_spent, 150.0);
        assert_eq!(overview.remaining, 350.0);
        assert_eq!((overview.packed, overview.packing_total), (1, 2));
        assert_eq!(overview.upcoming.unwrap().activity.name, "arrival");
    }

    #[test]
    fn countdown_goes_negative_once_the_trip_started() {
        let now = date("2025-06-11").and_hms_opt(12, 0, 0).unwrap();
        let overview = build_overview(trip(), Vec::new(), &[], &[], &[], now);
        assert_eq!(overview.days_until_start, -1);
        assert!(overview.upcoming.is_none());
    }
}
