//! Server-Sent Events for live queries.
//!
//! Each connection owns its subscription; when the client goes away axum
//! drops the stream and the subscription is cancelled with it.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{stream, Stream, StreamExt};
use serde::Serialize;
use tracing::warn;

use crate::{
    services::feed::ActivityFeed,
    store::{Snapshot, Subscription},
};

/// `Pending` produces no event; results go out as `snapshot`, failures as `error`.
pub fn snapshot_event<T: Serialize>(snapshot: Snapshot<T>) -> Option<Event> {
    match snapshot {
        Snapshot::Pending => None,
        Snapshot::Ready(value) => match Event::default().event("snapshot").json_data(value) {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(error = %err, "could not encode live snapshot");
                None
            }
        },
        Snapshot::Failed(message) => Some(Event::default().event("error").data(message)),
    }
}

pub fn subscription_sse<T>(
    subscription: Subscription<T>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    let snapshots = stream::unfold(subscription, |mut subscription| async move {
        let snapshot = subscription.changed().await.ok()?;
        Some((snapshot, subscription))
    });
    into_sse(snapshots)
}

pub fn feed_sse(feed: ActivityFeed) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    into_sse(feed.into_stream())
}

fn into_sse<T, S>(snapshots: S) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: Serialize + Send + 'static,
    S: Stream<Item = Snapshot<T>> + Send + 'static,
{
    let events = snapshots.filter_map(|snapshot| async move { snapshot_event(snapshot).map(Ok) });
    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
