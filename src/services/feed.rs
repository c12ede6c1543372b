//! Trip-wide activity list assembled from per-day live queries.
//!
//! The store can only watch one day's activities at a time, so an
//! [`ActivityFeed`] watches the trip's days and keeps one activity
//! subscription per day. Each time the day list changes the set of
//! subscriptions is reconciled against it: handles for removed days are
//! dropped (which cancels them) and new days get a fresh subscription.

use std::{
    collections::HashMap,
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;
use tokio::{sync::watch, task::JoinHandle};
use tokio_stream::{wrappers::WatchStream, StreamExt, StreamMap};
use tracing::debug;

use crate::{
    models::{
        activity::{Activity, ScheduledActivity},
        day::TripDay,
    },
    store::{
        queries::{ActivitiesQuery, DaysQuery},
        Snapshot, Store, Subscription,
    },
};

pub type FeedSnapshot = Snapshot<Vec<ScheduledActivity>>;

pub struct ActivityFeed {
    rx: watch::Receiver<FeedSnapshot>,
    task: JoinHandle<()>,
}

impl ActivityFeed {
    pub fn spawn(store: &Store, trip_id: impl Into<String>) -> Self {
        let trip_id = trip_id.into();
        let (tx, rx) = watch::channel(Snapshot::Pending);
        let days = store.watch(DaysQuery {
            trip_id: trip_id.clone(),
        });
        let task = tokio::spawn(run(store.clone(), trip_id, days, tx));
        Self { rx, task }
    }

    pub fn current(&self) -> FeedSnapshot {
        self.rx.borrow().clone()
    }

    /// Waits for the next merged list.
    pub async fn next_ready(&mut self) -> Option<Vec<ScheduledActivity>> {
        loop {
            self.rx.changed().await.ok()?;
            if let Snapshot::Ready(items) = self.rx.borrow_and_update().clone() {
                return Some(items);
            }
        }
    }

    /// Turns the feed into a stream of snapshots that keeps the feed alive
    /// for as long as the stream is held.
    pub fn into_stream(self) -> FeedStream {
        FeedStream {
            inner: WatchStream::new(self.rx.clone()),
            _feed: self,
        }
    }
}

impl Drop for ActivityFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct FeedStream {
    inner: WatchStream<FeedSnapshot>,
    _feed: ActivityFeed,
}

impl Stream for FeedStream {
    type Item = FeedSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

struct DayListener {
    day: TripDay,
    latest: Snapshot<Vec<Activity>>,
    _subscription: Subscription<Vec<Activity>>,
}

/// The owned set of per-day subscriptions, keyed by day id.
#[derive(Default)]
struct DayListeners {
    listeners: HashMap<String, DayListener>,
    updates: StreamMap<String, WatchStream<Snapshot<Vec<Activity>>>>,
}

impl DayListeners {
    fn reconcile(&mut self, store: &Store, trip_id: &str, days: &[TripDay]) {
        let stale: Vec<String> = self
            .listeners
            .keys()
            .filter(|id| !days.iter().any(|day| &day.id == *id))
            .cloned()
            .collect();
        for day_id in stale {
            self.updates.remove(&day_id);
            self.listeners.remove(&day_id);
            debug!(trip_id, day_id = %day_id, "dropped day listener");
        }

        for day in days {
            if let Some(listener) = self.listeners.get_mut(&day.id) {
                listener.day = day.clone();
                continue;
            }
            let subscription = store.watch(ActivitiesQuery {
                trip_id: trip_id.to_string(),
                day_id: day.id.clone(),
            });
            self.updates
                .insert(day.id.clone(), WatchStream::new(subscription.receiver()));
            self.listeners.insert(
                day.id.clone(),
                DayListener {
                    day: day.clone(),
                    latest: Snapshot::Pending,
                    _subscription: subscription,
                },
            );
            debug!(trip_id, day_id = %day.id, "added day listener");
        }
    }

    fn record(&mut self, day_id: &str, snapshot: Snapshot<Vec<Activity>>) {
        if let Some(listener) = self.listeners.get_mut(day_id) {
            listener.latest = snapshot;
        }
    }

    fn merged(&self) -> FeedSnapshot {
        let mut lists = Vec::with_capacity(self.listeners.len());
        for listener in self.listeners.values() {
            match &listener.latest {
                Snapshot::Pending => return Snapshot::Pending,
                Snapshot::Failed(message) => return Snapshot::Failed(message.clone()),
                Snapshot::Ready(activities) => lists.push((&listener.day, activities.as_slice())),
            }
        }
        Snapshot::Ready(merge_days(lists))
    }
}

/// Flattens per-day lists into itinerary order: day number, then the
/// activity's own order, then start time.
pub fn merge_days<'a>(
    days: impl IntoIterator<Item = (&'a TripDay, &'a [Activity])>,
) -> Vec<ScheduledActivity> {
    let mut merged: Vec<ScheduledActivity> = days
        .into_iter()
        .flat_map(|(day, activities)| {
            activities.iter().map(move |activity| ScheduledActivity {
                activity: activity.clone(),
                date: day.date,
                day_number: day.day_number,
            })
        })
        .collect();
    merged.sort_by(|a, b| {
        a.day_number
            .cmp(&b.day_number)
            .then(a.activity.order.cmp(&b.activity.order))
            .then_with(|| a.activity.start_time.cmp(&b.activity.start_time))
    });
    merged
}

async fn run(
    store: Store,
    trip_id: String,
    days: Subscription<Vec<TripDay>>,
    tx: watch::Sender<FeedSnapshot>,
) {
    let mut day_updates = WatchStream::new(days.receiver());
    let mut listeners = DayListeners::default();

    loop {
        tokio::select! {
            update = day_updates.next() => match update {
                None => break,
                Some(Snapshot::Pending) => continue,
                Some(Snapshot::Failed(message)) => {
                    tx.send_replace(Snapshot::Failed(message));
                    continue;
                }
                Some(Snapshot::Ready(list)) => listeners.reconcile(&store, &trip_id, &list),
            },
            Some((day_id, snapshot)) = listeners.updates.next(), if !listeners.updates.is_empty() => {
                listeners.record(&day_id, snapshot);
            }
        }

        let merged = listeners.merged();
        if merged.is_pending() {
            continue;
        }
        if tx.send(merged).is_err() {
            break;
        }
    }
}
