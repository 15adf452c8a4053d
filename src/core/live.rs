//! Live list queries.
//!
//! Every mutation publishes a [`ChangeEvent`] on the shared [`ChangeFeed`]. A
//! [`LiveQuery`] owns a background task that re-runs its filter whenever an
//! event touches one of its collections and exposes the latest result through
//! a `watch` channel. Dropping or stopping the query tears the task down.

use crate::{
    core::{
        campaign::{self, CampaignFilter},
        donation::{self, DonationFilter},
        notification::{self, NotificationFilter},
    },
    entities::{
        campaign as campaign_entity, donation as donation_entity,
        notification as notification_entity,
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::{fmt, future::Future, sync::Arc};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, warn};

/// Events kept for slow subscribers before they see `Lagged`
const FEED_CAPACITY: usize = 256;

/// A table whose rows live queries can follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Campaigns
    Campaigns,
    /// Donations
    Donations,
    /// Notifications
    Notifications,
    /// Users
    Users,
}

/// What happened to a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Inserted
    Created,
    /// Modified
    Updated,
    /// Removed
    Deleted,
}

/// A single row change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Table the row belongs to
    pub collection: Collection,
    /// What happened
    pub kind: ChangeKind,
    /// Primary key of the row, as text. Events built with
    /// [`ChangeEvent::notifications_for`] carry the recipient's user id instead.
    pub id: String,
}

impl ChangeEvent {
    /// Builds an event for a campaign row.
    #[must_use]
    pub fn campaign(kind: ChangeKind, id: i64) -> Self {
        Self {
            collection: Collection::Campaigns,
            kind,
            id: id.to_string(),
        }
    }

    /// Builds an event for a donation row.
    #[must_use]
    pub fn donation(kind: ChangeKind, id: i64) -> Self {
        Self {
            collection: Collection::Donations,
            kind,
            id: id.to_string(),
        }
    }

    /// Builds an event for a notification row.
    #[must_use]
    pub fn notification(kind: ChangeKind, id: i64) -> Self {
        Self {
            collection: Collection::Notifications,
            kind,
            id: id.to_string(),
        }
    }

    /// Builds an event for a bulk change to one user's notifications, such as
    /// marking all of them read or removing them with the account.
    #[must_use]
    pub fn notifications_for(kind: ChangeKind, user_id: &str) -> Self {
        Self {
            collection: Collection::Notifications,
            kind,
            id: user_id.to_string(),
        }
    }

    /// Builds an event for a user row.
    #[must_use]
    pub fn user(kind: ChangeKind, id: &str) -> Self {
        Self {
            collection: Collection::Users,
            kind,
            id: id.to_string(),
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {}", self.collection, self.kind, self.id)
    }
}

/// Process-wide change broadcaster. Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    /// Creates a feed with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    /// Announces a change. Having no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        debug!(%event, "Publishing change");
        let _ = self.sender.send(event);
    }

    /// Announces several changes in order.
    pub fn publish_all(&self, events: impl IntoIterator<Item = ChangeEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Opens a new receiver that sees events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

/// A query a [`LiveQuery`] can keep fresh.
pub trait LiveSource: Send + Sync + 'static {
    /// Row type returned by the query
    type Item: Clone + PartialEq + Send + Sync + 'static;

    /// Collections whose changes can alter the result
    fn collections(&self) -> &'static [Collection];

    /// Runs the query.
    fn fetch(
        &self,
        db: &DatabaseConnection,
    ) -> impl Future<Output = Result<Vec<Self::Item>>> + Send;
}

impl LiveSource for CampaignFilter {
    type Item = campaign_entity::Model;

    fn collections(&self) -> &'static [Collection] {
        &[Collection::Campaigns]
    }

    fn fetch(
        &self,
        db: &DatabaseConnection,
    ) -> impl Future<Output = Result<Vec<Self::Item>>> + Send {
        campaign::list_campaigns(db, self)
    }
}

impl LiveSource for DonationFilter {
    type Item = donation_entity::Model;

    fn collections(&self) -> &'static [Collection] {
        &[Collection::Donations]
    }

    fn fetch(
        &self,
        db: &DatabaseConnection,
    ) -> impl Future<Output = Result<Vec<Self::Item>>> + Send {
        donation::list_donations(db, self)
    }
}

impl LiveSource for NotificationFilter {
    type Item = notification_entity::Model;

    fn collections(&self) -> &'static [Collection] {
        &[Collection::Notifications]
    }

    fn fetch(
        &self,
        db: &DatabaseConnection,
    ) -> impl Future<Output = Result<Vec<Self::Item>>> + Send {
        notification::list_notifications(db, self)
    }
}

/// A subscription that keeps a query result up to date.
#[derive(Debug)]
pub struct LiveQuery<T> {
    receiver: watch::Receiver<Vec<T>>,
    task: JoinHandle<()>,
}

impl<T> LiveQuery<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Runs the query once and starts following the feed.
    ///
    /// The initial fetch error is returned to the caller. Later fetch errors
    /// are logged and the last good result is kept.
    pub async fn start<S>(
        db: Arc<DatabaseConnection>,
        feed: &ChangeFeed,
        source: S,
    ) -> Result<Self>
    where
        S: LiveSource<Item = T>,
    {
        // Subscribe before the first fetch so no change slips between them
        let mut events = feed.subscribe();
        let initial = source.fetch(&db).await?;
        let (sender, receiver) = watch::channel(initial);

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) if source.collections().contains(&event.collection) => {}
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Live query lagged, refreshing");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }

                match source.fetch(&db).await {
                    Ok(items) => {
                        sender.send_if_modified(|current| {
                            if *current == items {
                                false
                            } else {
                                *current = items;
                                true
                            }
                        });
                    }
                    Err(e) => warn!("Live query refresh failed: {e}"),
                }

                if sender.is_closed() {
                    break;
                }
            }
        });

        Ok(Self { receiver, task })
    }

    /// The most recent result.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.receiver.borrow().clone()
    }

    /// Waits until the result changes.
    pub async fn changed(&mut self) -> Result<()> {
        self.receiver
            .changed()
            .await
            .map_err(|_| Error::SubscriptionClosed)
    }

    /// Stops following the feed.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
