use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{
    error::AppError,
    models::packing::{PackingCategory, PackingItem},
};

use super::{new_id, Change, Store};

impl Store {
    pub async fn list_packing_items(&self, trip_id: &str) -> Result<Vec<PackingItem>, AppError> {
        let items = sqlx::query_as::<_, PackingItem>(
            "SELECT id, trip_id, name, category, packed FROM packing_items WHERE trip_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(trip_id)
        .fetch_all(self.db())
        .await?;
        Ok(items)
    }

    pub async fn get_packing_item(
        &self,
        trip_id: &str,
        item_id: &str,
    ) -> Result<Option<PackingItem>, AppError> {
        let item = sqlx::query_as::<_, PackingItem>(
            "SELECT id, trip_id, name, category, packed FROM packing_items WHERE trip_id = ? AND id = ?",
        )
        .bind(trip_id)
        .bind(item_id)
        .fetch_optional(self.db())
        .await?;
        Ok(item)
    }

    pub async fn create_packing_item(
        &self,
        trip_id: &str,
        name: &str,
        category: PackingCategory,
    ) -> Result<PackingItem, AppError> {
        let mut conn = self.db().acquire().await?;
        let item = insert_item(&mut conn, trip_id, name, category).await?;
        self.publish([Change::Packing {
            trip_id: trip_id.to_string(),
        }]);
        Ok(item)
    }

    pub async fn update_packing_item(&self, item: &PackingItem) -> Result<PackingItem, AppError> {
        sqlx::query("UPDATE packing_items SET name = ?, category = ?, packed = ? WHERE trip_id = ? AND id = ?")
            .bind(&item.name)
            .bind(item.category.as_str())
            .bind(item.packed)
            .bind(&item.trip_id)
            .bind(&item.id)
            .execute(self.db())
            .await?;
        self.publish([Change::Packing {
            trip_id: item.trip_id.clone(),
        }]);
        Ok(item.clone())
    }

    pub async fn delete_packing_item(&self, trip_id: &str, item_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM packing_items WHERE trip_id = ? AND id = ?")
            .bind(trip_id)
            .bind(item_id)
            .execute(self.db())
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            self.publish([Change::Packing {
                trip_id: trip_id.to_string(),
            }]);
        }
        Ok(deleted)
    }
}

pub(super) async fn insert_item(
    conn: &mut SqliteConnection,
    trip_id: &str,
    name: &str,
    category: PackingCategory,
) -> Result<PackingItem, sqlx::Error> {
    let item = PackingItem {
        id: new_id(),
        trip_id: trip_id.to_string(),
        name: name.to_string(),
        category,
        packed: false,
    };
    sqlx::query(
        "INSERT INTO packing_items (id, trip_id, name, category, packed, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&item.id)
    .bind(&item.trip_id)
    .bind(&item.name)
    .bind(item.category.as_str())
    .bind(item.packed)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(item)
}
