//! Runs a synchronizer on the tokio clock

use crate::synchronizer::{ExpressionSynchronizer, NarratorSnapshot};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Tick fine enough for the 200ms blink check
pub const DEFAULT_TICK: Duration = Duration::from_millis(50);

/// Owns the driver task; dropping it stops the timers
#[derive(Debug)]
pub struct DriverHandle {
    task: JoinHandle<()>,
    snapshots: watch::Receiver<NarratorSnapshot>,
}

impl DriverHandle {
    /// Latest published state; changes are signalled through [`watch::Receiver::changed`]
    pub fn snapshots(&self) -> watch::Receiver<NarratorSnapshot> {
        self.snapshots.clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Ticks `sync` every `tick` and publishes each changed snapshot
///
/// Must be called from within a tokio runtime.
pub fn spawn_driver(sync: Arc<Mutex<ExpressionSynchronizer>>, tick: Duration) -> DriverHandle {
    let initial = sync
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .snapshot();
    let (tx, rx) = watch::channel(initial);

    let task = tokio::spawn(async move {
        let mut interval = time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let now = Instant::now().into_std();
            let snapshot = sync
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .tick(now);
            tx.send_if_modified(|current| {
                if *current == snapshot {
                    false
                } else {
                    log::trace!("Narrator {:?}", snapshot);
                    *current = snapshot;
                    true
                }
            });
        }
    });

    DriverHandle { task, snapshots: rx }
}
