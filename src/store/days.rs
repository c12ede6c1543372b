use sqlx::{sqlite::SqliteExecutor, SqliteConnection};

use crate::{
    error::AppError,
    models::day::{DayPlan, TripDay},
};

use super::{new_id, Change, Store};

impl Store {
    pub async fn list_days(&self, trip_id: &str) -> Result<Vec<TripDay>, AppError> {
        Ok(select_days(self.db(), trip_id).await?)
    }

    pub async fn get_day(&self, trip_id: &str, day_id: &str) -> Result<Option<TripDay>, AppError> {
        let day = sqlx::query_as::<_, TripDay>(
            "SELECT id, trip_id, date, day_number FROM trip_days WHERE trip_id = ? AND id = ?",
        )
        .bind(trip_id)
        .bind(day_id)
        .fetch_optional(self.db())
        .await?;
        Ok(day)
    }
}

pub(super) async fn select_days<'c>(
    executor: impl SqliteExecutor<'c>,
    trip_id: &str,
) -> Result<Vec<TripDay>, sqlx::Error> {
    sqlx::query_as::<_, TripDay>(
        "SELECT id, trip_id, date, day_number FROM trip_days WHERE trip_id = ? ORDER BY day_number ASC, date ASC",
    )
    .bind(trip_id)
    .fetch_all(executor)
    .await
}

/// Deletes each removed day's activities before the day itself, then
/// inserts the new days.
pub(super) async fn apply_day_plan(
    conn: &mut SqliteConnection,
    trip_id: &str,
    plan: &DayPlan,
) -> Result<(), sqlx::Error> {
    for day in &plan.remove {
        sqlx::query("DELETE FROM activities WHERE trip_id = ? AND day_id = ?")
            .bind(trip_id)
            .bind(&day.id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM trip_days WHERE trip_id = ? AND id = ?")
            .bind(trip_id)
            .bind(&day.id)
            .execute(&mut *conn)
            .await?;
    }
    for day in &plan.add {
        sqlx::query("INSERT INTO trip_days (id, trip_id, date, day_number) VALUES (?, ?, ?, ?)")
            .bind(new_id())
            .bind(trip_id)
            .bind(day.date)
            .bind(day.day_number)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub(super) fn day_plan_changes(trip_id: &str, plan: &DayPlan) -> Vec<Change> {
    let mut changes = vec![Change::Days {
        trip_id: trip_id.to_string(),
    }];
    changes.extend(plan.remove.iter().map(|day| Change::Activities {
        trip_id: trip_id.to_string(),
        day_id: day.id.clone(),
    }));
    changes
}
