//! Persistence for trips and everything nested under them.
//!
//! Every write commits first, then publishes a [`Change`] so that live
//! queries (see [`live`]) can refetch.

pub mod activities;
pub mod changes;
pub mod days;
pub mod expenses;
pub mod live;
pub mod packing;
pub mod queries;
pub mod trips;
pub mod users;

use uuid::Uuid;

use crate::db::DbPool;

pub use changes::{Change, ChangeFeed};
pub use live::{LiveQuery, Snapshot, Subscription};

#[derive(Clone)]
pub struct Store {
    db: DbPool,
    feed: ChangeFeed,
}

impl Store {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            feed: ChangeFeed::default(),
        }
    }

    pub fn db(&self) -> &DbPool {
        &self.db
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    pub(crate) fn publish(&self, changes: impl IntoIterator<Item = Change>) {
        for change in changes {
            self.feed.publish(change);
        }
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
