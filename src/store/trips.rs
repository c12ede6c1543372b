use chrono::Utc;
use sqlx::sqlite::SqliteExecutor;

use crate::{
    error::AppError,
    models::{
        day::{DayPlan, TripDay},
        packing::PackingCategory,
        trip::{Trip, TripFields},
    },
};

use super::{days, new_id, packing, Change, Store};

const TRIP_COLUMNS: &str = "id, title, destination, lat, lng, start_date, end_date, total_budget, currency, created_by, created_at";

impl Store {
    pub async fn list_trips(&self, owner: &str) -> Result<Vec<Trip>, AppError> {
        let trips = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE created_by = ? ORDER BY start_date ASC, created_at ASC"
        ))
        .bind(owner)
        .fetch_all(self.db())
        .await?;
        Ok(trips)
    }

    pub async fn get_trip(&self, trip_id: &str) -> Result<Option<Trip>, AppError> {
        Ok(select_trip(self.db(), trip_id).await?)
    }

    /// Inserts the trip, its days and its starter packing list together.
    pub async fn create_trip(
        &self,
        owner: &str,
        fields: &TripFields,
        days: &DayPlan,
        packing_items: &[(&str, PackingCategory)],
    ) -> Result<(Trip, Vec<TripDay>), AppError> {
        let trip = Trip {
            id: new_id(),
            title: fields.title.clone(),
            destination: fields.destination.clone(),
            lat: fields.lat,
            lng: fields.lng,
            start_date: fields.start_date,
            end_date: fields.end_date,
            total_budget: fields.total_budget,
            currency: fields.currency,
            created_by: owner.to_string(),
            created_at: Utc::now(),
        };

        let mut tx = self.db().begin().await?;
        sqlx::query(
            r#"INSERT INTO trips (id, title, destination, lat, lng, start_date, end_date, total_budget, currency, created_by, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&trip.id)
        .bind(&trip.title)
        .bind(&trip.destination)
        .bind(trip.lat)
        .bind(trip.lng)
        .bind(trip.start_date)
        .bind(trip.end_date)
        .bind(trip.total_budget)
        .bind(trip.currency.as_str())
        .bind(&trip.created_by)
        .bind(trip.created_at)
        .execute(&mut *tx)
        .await?;
        days::apply_day_plan(&mut tx, &trip.id, days).await?;
        for (name, category) in packing_items {
            packing::insert_item(&mut tx, &trip.id, name, *category).await?;
        }
        tx.commit().await?;

        self.publish([
            Change::Trips {
                owner: owner.to_string(),
            },
            Change::Trip {
                trip_id: trip.id.clone(),
            },
            Change::Days {
                trip_id: trip.id.clone(),
            },
            Change::Packing {
                trip_id: trip.id.clone(),
            },
        ]);

        let days = self.list_days(&trip.id).await?;
        Ok((trip, days))
    }

    /// Rewrites the trip while holding the database write lock. `plan` is
    /// handed the trip and its days as stored inside the transaction and
    /// returns the new field values with the day changes they need.
    pub async fn update_trip<F>(&self, trip_id: &str, plan: F) -> Result<(Trip, DayPlan), AppError>
    where
        F: FnOnce(&Trip, &[TripDay]) -> Result<(TripFields, DayPlan), AppError> + Send,
    {
        let mut tx = self.db().begin().await?;
        // Write before reading so overlapping updates queue on the lock
        // instead of planning from the same day list.
        let claimed = sqlx::query("UPDATE trips SET id = id WHERE id = ?")
            .bind(trip_id)
            .execute(&mut *tx)
            .await?;
        if claimed.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        let current = select_trip(&mut *tx, trip_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let existing = days::select_days(&mut *tx, trip_id).await?;
        let (fields, day_plan) = plan(&current, &existing)?;

        sqlx::query(
            r#"UPDATE trips
               SET title = ?, destination = ?, lat = ?, lng = ?, start_date = ?, end_date = ?, total_budget = ?, currency = ?
               WHERE id = ?"#,
        )
        .bind(&fields.title)
        .bind(&fields.destination)
        .bind(fields.lat)
        .bind(fields.lng)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.total_budget)
        .bind(fields.currency.as_str())
        .bind(trip_id)
        .execute(&mut *tx)
        .await?;
        days::apply_day_plan(&mut tx, trip_id, &day_plan).await?;
        let updated = select_trip(&mut *tx, trip_id)
            .await?
            .ok_or(AppError::NotFound)?;
        tx.commit().await?;

        let mut changes = vec![
            Change::Trips {
                owner: updated.created_by.clone(),
            },
            Change::Trip {
                trip_id: updated.id.clone(),
            },
        ];
        if !day_plan.is_empty() {
            changes.extend(days::day_plan_changes(trip_id, &day_plan));
        }
        self.publish(changes);

        Ok((updated, day_plan))
    }

    /// Removes the trip together with its days, activities, expenses and
    /// packing items.
    pub async fn delete_trip(&self, trip: &Trip) -> Result<(), AppError> {
        let mut tx = self.db().begin().await?;
        let day_ids: Vec<String> =
            sqlx::query_scalar("DELETE FROM trip_days WHERE trip_id = ? RETURNING id")
                .bind(&trip.id)
                .fetch_all(&mut *tx)
                .await?;
        for table in ["activities", "expenses", "packing_items"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE trip_id = ?"))
                .bind(&trip.id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("UPDATE users SET last_trip_id = NULL WHERE last_trip_id = ?")
            .bind(&trip.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM trips WHERE id = ?")
            .bind(&trip.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let trip_id = trip.id.clone();
        let mut changes = vec![
            Change::Trips {
                owner: trip.created_by.clone(),
            },
            Change::Trip {
                trip_id: trip_id.clone(),
            },
            Change::Days {
                trip_id: trip_id.clone(),
            },
            Change::Expenses {
                trip_id: trip_id.clone(),
            },
            Change::Packing {
                trip_id: trip_id.clone(),
            },
            Change::Profile {
                user_uuid: trip.created_by.clone(),
            },
        ];
        changes.extend(day_ids.into_iter().map(|day_id| Change::Activities {
            trip_id: trip_id.clone(),
            day_id,
        }));
        self.publish(changes);
        Ok(())
    }
}

async fn select_trip<'c>(
    executor: impl SqliteExecutor<'c>,
    trip_id: &str,
) -> Result<Option<Trip>, sqlx::Error> {
    sqlx::query_as::<_, Trip>(&format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?"))
        .bind(trip_id)
        .fetch_optional(executor)
        .await
}
