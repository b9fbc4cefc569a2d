//! Periodic polling for updated objects of one type.

use crate::client::SyncServiceClient;
use crate::error::ClientResult;
use std::time::Duration;
use syncservice_types::ObjectMetadata;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Polls a node for updated objects of one type.
///
/// The first successful poll asks for every update, including ones already
/// marked received, so nothing is lost across restarts. Later polls only ask
/// for unreceived objects.
#[derive(Debug)]
pub struct UpdatesPoller {
    client: SyncServiceClient,
    object_type: String,
    interval: Duration,
    first_poll: bool,
}

impl UpdatesPoller {
    pub fn new(client: SyncServiceClient, object_type: impl Into<String>, interval: Duration) -> Self {
        Self {
            client,
            object_type: object_type.into(),
            interval,
            first_poll: true,
        }
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// Runs one poll. Failed polls leave the next one asking for everything
    /// again.
    pub async fn poll_once(&mut self) -> ClientResult<Vec<ObjectMetadata>> {
        let objects = self
            .client
            .list_updated_objects(&self.object_type, self.first_poll)
            .await?;
        self.first_poll = false;
        Ok(objects)
    }

    /// Polls every `interval` and forwards each object to `updates`.
    ///
    /// Returns once `shutdown` turns true, its sender is dropped, or the
    /// receiving side of `updates` goes away.
    pub async fn run(mut self, updates: mpsc::Sender<ObjectMetadata>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("polling {} every {:?}", self.object_type, self.interval);

        'poll: loop {
            match self.poll_once().await {
                Ok(objects) => {
                    debug!("{} updated {} object(s)", self.object_type, objects.len());
                    for object in objects {
                        if updates.send(object).await.is_err() {
                            break 'poll;
                        }
                    }
                }
                Err(e) => warn!("polling {} failed: {}", self.object_type, e),
            }

            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = updates.closed() => break,
            }
        }

        info!("stopped polling {}", self.object_type);
    }
}
