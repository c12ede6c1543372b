//! The live queries the app subscribes to.

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        activity::Activity, day::TripDay, expense::Expense, packing::PackingItem, trip::Trip,
        user::UserProfile,
    },
};

use super::{Change, LiveQuery, Store};

/// Trips owned by one user, by start date.
pub struct TripsQuery {
    pub owner: String,
}

#[async_trait]
impl LiveQuery for TripsQuery {
    type Output = Vec<Trip>;

    fn watches(&self, change: &Change) -> bool {
        matches!(change, Change::Trips { owner } if *owner == self.owner)
    }

    async fn fetch(&self, store: &Store) -> Result<Self::Output, AppError> {
        store.list_trips(&self.owner).await
    }
}

/// One trip; `None` once it has been deleted.
pub struct TripQuery {
    pub trip_id: String,
}

#[async_trait]
impl LiveQuery for TripQuery {
    type Output = Option<Trip>;

    fn watches(&self, change: &Change) -> bool {
        matches!(change, Change::Trip { trip_id } if *trip_id == self.trip_id)
    }

    async fn fetch(&self, store: &Store) -> Result<Self::Output, AppError> {
        store.get_trip(&self.trip_id).await
    }
}

pub struct ProfileQuery {
    pub user_uuid: String,
}

#[async_trait]
impl LiveQuery for ProfileQuery {
    type Output = Option<UserProfile>;

    fn watches(&self, change: &Change) -> bool {
        matches!(change, Change::Profile { user_uuid } if *user_uuid == self.user_uuid)
    }

    async fn fetch(&self, store: &Store) -> Result<Self::Output, AppError> {
        let user = store.find_user_by_uuid(&self.user_uuid).await?;
        Ok(user.map(|user| user.profile()))
    }
}

pub struct DaysQuery {
    pub trip_id: String,
}

#[async_trait]
impl LiveQuery for DaysQuery {
    type Output = Vec<TripDay>;

    fn watches(&self, change: &Change) -> bool {
        matches!(change, Change::Days { trip_id } if *trip_id == self.trip_id)
    }

    async fn fetch(&self, store: &Store) -> Result<Self::Output, AppError> {
        store.list_days(&self.trip_id).await
    }
}

pub struct ActivitiesQuery {
    pub trip_id: String,
    pub day_id: String,
}

#[async_trait]
impl LiveQuery for ActivitiesQuery {
    type Output = Vec<Activity>;

    fn watches(&self, change: &Change) -> bool {
        matches!(
            change,
            Change::Activities { trip_id, day_id }
                if *trip_id == self.trip_id && *day_id == self.day_id
        )
    }

    async fn fetch(&self, store: &Store) -> Result<Self::Output, AppError> {
        store.list_activities(&self.trip_id, &self.day_id).await
    }
}

pub struct ExpensesQuery {
    pub trip_id: String,
}

#[async_trait]
impl LiveQuery for ExpensesQuery {
    type Output = Vec<Expense>;

    fn watches(&self, change: &Change) -> bool {
        matches!(change, Change::Expenses { trip_id } if *trip_id == self.trip_id)
    }

    async fn fetch(&self, store: &Store) -> Result<Self::Output, AppError> {
        store.list_expenses(&self.trip_id).await
    }
}

pub struct PackingQuery {
    pub trip_id: String,
}

#[async_trait]
impl LiveQuery for PackingQuery {
    type Output = Vec<PackingItem>;

    fn watches(&self, change: &Change) -> bool {
        matches!(change, Change::Packing { trip_id } if *trip_id == self.trip_id)
    }

    async fn fetch(&self, store: &Store) -> Result<Self::Output, AppError> {
        store.list_packing_items(&self.trip_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_query_only_watches_its_own_day() {
        let query = ActivitiesQuery {
            trip_id: "t1".into(),
            day_id: "d1".into(),
        };
        assert!(query.watches(&Change::Activities {
            trip_id: "t1".into(),
            day_id: "d1".into(),
        }));
        assert!(!query.watches(&Change::Activities {
            trip_id: "t1".into(),
            day_id: "d2".into(),
        }));
        assert!(!query.watches(&Change::Days {
            trip_id: "t1".into()
        }));
    }
}
