use std::time::Duration;

use tokio::{sync::mpsc, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{CountSnapshot, CountSource, Notification, Tab, UnreadBadges, diff};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

pub struct DashboardPoller<S> {
    source: S,
    snapshot: Option<CountSnapshot>,
    badges: UnreadBadges,
}

impl<S: CountSource> DashboardPoller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            snapshot: None,
            badges: UnreadBadges::default(),
        }
    }

    pub fn snapshot(&self) -> Option<CountSnapshot> {
        self.snapshot
    }

    pub fn badges(&self) -> UnreadBadges {
        self.badges
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches the latest counts and diffs them against the stored snapshot.
    ///
    /// The first successful poll only records a baseline. A failed fetch
    /// returns the error and leaves both snapshot and badges as they were.
    pub async fn poll(&mut self) -> anyhow::Result<Vec<Notification>> {
        let latest = self.source.fetch_counts().await?;

        let notifications = match &self.snapshot {
            Some(previous) => diff(previous, &latest),
            None => Vec::new(),
        };
        for notification in &notifications {
            self.badges.add(notification.tab, notification.delta as u64);
        }
        self.snapshot = Some(latest);

        Ok(notifications)
    }

    pub fn mark_viewed(&mut self, tab: Tab) {
        self.badges.clear(tab);
    }

    /// Polls on a fixed interval until `cancel` fires or `sink` is closed.
    ///
    /// Failed ticks are logged and retried on the next tick. The poller is
    /// handed back so callers can inspect the final snapshot and badges.
    pub async fn run(
        mut self,
        interval: Duration,
        cancel: CancellationToken,
        sink: mpsc::Sender<Notification>,
    ) -> Self {
        tracing::info!(interval_secs = interval.as_secs(), "dashboard poller started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("dashboard poller stopping");
                    break;
                }
                _ = ticker.tick() => {
                    match self.poll().await {
                        Ok(notifications) => {
                            if notifications.is_empty() {
                                tracing::debug!("dashboard poll: no new items");
                            }
                            for notification in notifications {
                                if sink.send(notification).await.is_err() {
                                    tracing::info!("notification sink closed, dashboard poller stopping");
                                    return self;
                                }
                            }
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "dashboard poll failed, keeping previous snapshot");
                        }
                    }
                }
            }
        }

        self
    }
}
