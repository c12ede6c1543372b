//! Live query subscriptions.
//!
//! A [`Subscription`] owns a background task that fetches its query once,
//! then refetches whenever a [`Change`] it watches is published. The latest
//! result is held in a `watch` channel. Cancelling or dropping the handle
//! aborts the task, so a listener cannot outlive its owner.

use async_trait::async_trait;
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::error::AppError;

use super::{changes::Change, Store};

#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot<T> {
    /// No result delivered yet.
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> Snapshot<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Snapshot::Pending)
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Snapshot::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[async_trait]
pub trait LiveQuery: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    fn watches(&self, change: &Change) -> bool;

    async fn fetch(&self, store: &Store) -> Result<Self::Output, AppError>;
}

pub struct Subscription<T> {
    rx: watch::Receiver<Snapshot<T>>,
    task: JoinHandle<()>,
}

impl<T: Clone> Subscription<T> {
    pub fn current(&self) -> Snapshot<T> {
        self.rx.borrow().clone()
    }

    /// A second reader of the same snapshots. It stops receiving updates
    /// once this subscription is cancelled.
    pub fn receiver(&self) -> watch::Receiver<Snapshot<T>> {
        self.rx.clone()
    }

    /// Waits for the next snapshot that differs from the one last seen.
    pub async fn changed(&mut self) -> Result<Snapshot<T>, AppError> {
        self.rx
            .changed()
            .await
            .map_err(|_| AppError::Other(anyhow::anyhow!("live query stopped")))?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Waits until the query has produced a result.
    pub async fn ready(&mut self) -> Result<T, AppError> {
        loop {
            match self.rx.borrow_and_update().clone() {
                Snapshot::Ready(value) => return Ok(value),
                Snapshot::Failed(message) => return Err(AppError::Other(anyhow::anyhow!(message))),
                Snapshot::Pending => {}
            }
            self.rx
                .changed()
                .await
                .map_err(|_| AppError::Other(anyhow::anyhow!("live query stopped")))?;
        }
    }

    pub fn cancel(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl Store {
    /// Registers a live query. The first snapshot arrives once the initial
    /// fetch completes.
    pub fn watch<Q: LiveQuery>(&self, query: Q) -> Subscription<Q::Output> {
        let (tx, rx) = watch::channel(Snapshot::Pending);
        // Subscribe before the first fetch so no write can slip in between.
        let mut changes = self.feed().subscribe();
        let store = self.clone();

        let task = tokio::spawn(async move {
            let mut refetch = true;
            loop {
                if refetch {
                    let snapshot = match query.fetch(&store).await {
                        Ok(value) => Snapshot::Ready(value),
                        Err(err) => {
                            warn!(error = %err, "live query fetch failed");
                            Snapshot::Failed(err.to_string())
                        }
                    };
                    if tx.send(snapshot).is_err() {
                        break;
                    }
                }
                refetch = match changes.recv().await {
                    Ok(change) => query.watches(&change),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "live query lagged behind change feed");
                        true
                    }
                    Err(RecvError::Closed) => break,
                };
            }
        });

        Subscription { rx, task }
    }
}
