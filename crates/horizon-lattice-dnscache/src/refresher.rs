//! Background task that sweeps a resolver on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::backend::HostResolver;
use crate::config::RefreshConfig;
use crate::resolver::Resolver;

const TRACING_TARGET: &str = "horizon_lattice_dnscache::refresh";

/// Handle to a running background refresher.
///
/// The refresher stops when [`stop`](Self::stop) is called or the handle is
/// dropped. A sweep that is in progress is abandoned between two store
/// operations, so no entry is left half-updated.
#[derive(Debug)]
pub struct RefreshHandle {
    cancel_token: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshHandle {
    /// Check whether the refresher task is still running.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Request the refresher to stop without waiting for it.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    /// Stop the refresher and wait for the task to exit.
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                tracing::warn!(target: TRACING_TARGET, error = %err, "Refresher task failed");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

impl<B: HostResolver + 'static> Resolver<B> {
    /// Spawn a task on the current tokio runtime that calls
    /// [`refresh`](Self::refresh) every `config.interval`.
    ///
    /// The first sweep runs one interval after spawning. A zero interval is
    /// raised to one millisecond.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn spawn_refresher(self: &Arc<Self>, config: RefreshConfig) -> RefreshHandle {
        let cancel_token = CancellationToken::new();
        let resolver = Arc::clone(self);
        let token = cancel_token.clone();

        let task = tokio::spawn(async move {
            tracing::info!(
                target: TRACING_TARGET,
                interval_ms = config.interval.as_millis() as u64,
                clear_unused = config.clear_unused,
                "Starting background refresher"
            );

            let period = config.interval.max(Duration::from_millis(1));
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        tokio::select! {
                            biased;

                            () = token.cancelled() => break,
                            () = resolver.refresh(config.clear_unused) => {}
                        }
                    }
                }
            }

            tracing::info!(target: TRACING_TARGET, "Stopped background refresher");
        });

        RefreshHandle {
            cancel_token,
            task: Mutex::new(Some(task)),
        }
    }
}
