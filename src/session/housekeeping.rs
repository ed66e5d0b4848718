//! Periodic session sweeping.
//!
//! # Responsibilities
//! - Call [`SessionStore::house_keeping`] on a fixed interval
//! - Stop promptly when the owning handle shuts it down

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::store::SessionStore;

pub struct Housekeeper {
    store: Arc<dyn SessionStore>,
    interval: Duration,
}

impl Housekeeper {
    pub fn new(store: Arc<dyn SessionStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Session housekeeper starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.store.house_keeping();
                    tracing::trace!(removed, "Session sweep finished");
                }
                _ = shutdown.recv() => {
                    tracing::info!("Session housekeeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run on the current tokio runtime until the returned handle is shut down.
    pub fn spawn(self) -> HousekeepingHandle {
        let (shutdown, rx) = broadcast::channel(1);
        let task = tokio::spawn(self.run(rx));
        HousekeepingHandle { shutdown, task }
    }
}

/// Owner of a spawned [`Housekeeper`].
#[derive(Debug)]
pub struct HousekeepingHandle {
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl HousekeepingHandle {
    /// Signal the sweeper and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Session housekeeper task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
