use sqlx::{FromRow, Row};

use crate::{
    error::AppError,
    models::activity::{Activity, ActivityFields, ScheduledActivity},
};

use super::{new_id, Change, Store};

const ACTIVITY_COLUMNS: &str = "a.id, a.trip_id, a.day_id, a.name, a.start_time, a.end_time, a.location, a.lat, a.lng, a.category, a.notes, a.estimated_cost, a.sort_order";

impl Store {
    pub async fn list_activities(
        &self,
        trip_id: &str,
        day_id: &str,
    ) -> Result<Vec<Activity>, AppError> {
        let activities = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities a WHERE a.trip_id = ? AND a.day_id = ? ORDER BY a.sort_order ASC, a.start_time ASC"
        ))
        .bind(trip_id)
        .bind(day_id)
        .fetch_all(self.db())
        .await?;
        Ok(activities)
    }

    /// All of a trip's activities in itinerary order, read in one query.
    pub async fn list_trip_activities(
        &self,
        trip_id: &str,
    ) -> Result<Vec<ScheduledActivity>, AppError> {
        let rows = sqlx::query(&format!(
            r#"SELECT {ACTIVITY_COLUMNS}, d.date AS day_date, d.day_number AS day_number
               FROM activities a
               JOIN trip_days d ON d.id = a.day_id AND d.trip_id = a.trip_id
               WHERE a.trip_id = ?
               ORDER BY d.day_number ASC, a.sort_order ASC, a.start_time ASC"#
        ))
        .bind(trip_id)
        .fetch_all(self.db())
        .await?;

        let mut scheduled = Vec::with_capacity(rows.len());
        for row in rows {
            scheduled.push(ScheduledActivity {
                activity: Activity::from_row(&row)?,
                date: row.try_get("day_date")?,
                day_number: row.try_get("day_number")?,
            });
        }
        Ok(scheduled)
    }

    pub async fn get_activity(
        &self,
        trip_id: &str,
        day_id: &str,
        activity_id: &str,
    ) -> Result<Option<Activity>, AppError> {
        let activity = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities a WHERE a.trip_id = ? AND a.day_id = ? AND a.id = ?"
        ))
        .bind(trip_id)
        .bind(day_id)
        .bind(activity_id)
        .fetch_optional(self.db())
        .await?;
        Ok(activity)
    }

    /// Without an explicit `order` the activity goes after the day's
    /// existing ones.
    pub async fn create_activity(
        &self,
        trip_id: &str,
        day_id: &str,
        fields: &ActivityFields,
        order: Option<i64>,
    ) -> Result<Activity, AppError> {
        let order = match order {
            Some(order) => order,
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM activities WHERE trip_id = ? AND day_id = ?",
                )
                .bind(trip_id)
                .bind(day_id)
                .fetch_one(self.db())
                .await?
            }
        };

        let activity = Activity {
            id: new_id(),
            trip_id: trip_id.to_string(),
            day_id: day_id.to_string(),
            name: fields.name.clone(),
            start_time: fields.start_time.clone(),
            end_time: fields.end_time.clone(),
            location: fields.location.clone(),
            lat: fields.lat,
            lng: fields.lng,
            category: fields.category,
            notes: fields.notes.clone(),
            estimated_cost: fields.estimated_cost,
            order,
        };
        sqlx::query(
            r#"INSERT INTO activities (id, trip_id, day_id, name, start_time, end_time, location, lat, lng, category, notes, estimated_cost, sort_order)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&activity.id)
        .bind(&activity.trip_id)
        .bind(&activity.day_id)
        .bind(&activity.name)
        .bind(&activity.start_time)
        .bind(&activity.end_time)
        .bind(&activity.location)
        .bind(activity.lat)
        .bind(activity.lng)
        .bind(activity.category.as_str())
        .bind(&activity.notes)
        .bind(activity.estimated_cost)
        .bind(activity.order)
        .execute(self.db())
        .await?;

        self.publish([Change::Activities {
            trip_id: trip_id.to_string(),
            day_id: day_id.to_string(),
        }]);
        Ok(activity)
    }

    pub async fn update_activity(
        &self,
        activity: &Activity,
        fields: &ActivityFields,
    ) -> Result<Activity, AppError> {
        sqlx::query(
            r#"UPDATE activities
               SET name = ?, start_time = ?, end_time = ?, location = ?, lat = ?, lng = ?, category = ?, notes = ?, estimated_cost = ?
               WHERE trip_id = ? AND day_id = ? AND id = ?"#,
        )
        .bind(&fields.name)
        .bind(&fields.start_time)
        .bind(&fields.end_time)
        .bind(&fields.location)
        .bind(fields.lat)
        .bind(fields.lng)
        .bind(fields.category.as_str())
        .bind(&fields.notes)
        .bind(fields.estimated_cost)
        .bind(&activity.trip_id)
        .bind(&activity.day_id)
        .bind(&activity.id)
        .execute(self.db())
        .await?;

        self.publish([Change::Activities {
            trip_id: activity.trip_id.clone(),
            day_id: activity.day_id.clone(),
        }]);
        Ok(Activity {
            name: fields.name.clone(),
            start_time: fields.start_time.clone(),
            end_time: fields.end_time.clone(),
            location: fields.location.clone(),
            lat: fields.lat,
            lng: fields.lng,
            category: fields.category,
            notes: fields.notes.clone(),
            estimated_cost: fields.estimated_cost,
            ..activity.clone()
        })
    }

    pub async fn delete_activity(
        &self,
        trip_id: &str,
        day_id: &str,
        activity_id: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM activities WHERE trip_id = ? AND day_id = ? AND id = ?")
            .bind(trip_id)
            .bind(day_id)
            .bind(activity_id)
            .execute(self.db())
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            self.publish([Change::Activities {
                trip_id: trip_id.to_string(),
                day_id: day_id.to_string(),
            }]);
        }
        Ok(deleted)
    }

    /// Rewrites `order` to each id's position in `ordered_ids`. Ids that do
    /// not belong to the day abort the whole reorder.
    pub async fn reorder_activities(
        &self,
        trip_id: &str,
        day_id: &str,
        ordered_ids: &[String],
    ) -> Result<Vec<Activity>, AppError> {
        let mut tx = self.db().begin().await?;
        for (position, activity_id) in ordered_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE activities SET sort_order = ? WHERE trip_id = ? AND day_id = ? AND id = ?",
            )
            .bind(position as i64)
            .bind(trip_id)
            .bind(day_id)
            .bind(activity_id)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(AppError::NotFound);
            }
        }
        tx.commit().await?;

        self.publish([Change::Activities {
            trip_id: trip_id.to_string(),
            day_id: day_id.to_string(),
        }]);
        self.list_activities(trip_id, day_id).await
    }
}
