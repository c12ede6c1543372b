//! In-process change notifications published after every committed write.

use tokio::sync::broadcast;

/// Which slice of data a committed write touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The set of trips owned by `owner` (created, updated, deleted).
    Trips { owner: String },
    /// A single trip document.
    Trip { trip_id: String },
    Days { trip_id: String },
    Activities { trip_id: String, day_id: String },
    Expenses { trip_id: String },
    Packing { trip_id: String },
    Profile { user_uuid: String },
}

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<Change>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, change: Change) {
        // Only fails when nobody is listening.
        let _ = self.sender.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_sees_each_change() {
        let feed = ChangeFeed::default();
        let mut first = feed.subscribe();
        let mut second = feed.subscribe();

        feed.publish(Change::Days {
            trip_id: "t1".into(),
        });

        let expected = Change::Days {
            trip_id: "t1".into(),
        };
        assert_eq!(first.recv().await.unwrap(), expected);
        assert_eq!(second.recv().await.unwrap(), expected);
    }

    #[test]
    fn publishing_without_listeners_is_fine() {
        let feed = ChangeFeed::default();
        feed.publish(Change::Profile {
            user_uuid: "u1".into(),
        });
        assert_eq!(feed.listener_count(), 0);
    }
}
