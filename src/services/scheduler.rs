//! Timer-driven refresh of the shared views.
//!
//! A [`RefreshTask`] owns one builder and one [`SnapshotCell`]. Every tick
//! starts a cycle: build, retry per the [`RetryPolicy`] on failure, publish
//! on success. At most one cycle per task is in flight; a tick that finds
//! the previous cycle still running is skipped. Failed cycles leave the
//! published value untouched.

use super::{CandidateSnapshotBuilder, FolderIndexBuilder, RetryPolicy};
use crate::Result;
use crate::models::{CandidateSnapshot, FolderIndex};
use crate::state::SnapshotCell;
use crate::storage::{DocumentStore, FileStore};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Something a [`RefreshTask`] can rebuild.
pub trait RefreshSource: Send + Sync + 'static {
    /// The value published on success.
    type Output: Send + Sync + 'static;

    /// Label used in logs and metrics.
    const NAME: &'static str;

    /// Builds a fresh value.
    fn build(&self) -> impl Future<Output = Result<Self::Output>> + Send;

    /// Size of a built value, for logs and metrics.
    fn item_count(output: &Self::Output) -> usize;
}

impl<D: DocumentStore + 'static> RefreshSource for CandidateSnapshotBuilder<D> {
    type Output = CandidateSnapshot;

    const NAME: &'static str = "candidates";

    fn build(&self) -> impl Future<Output = Result<CandidateSnapshot>> + Send {
        self.fetch()
    }

    fn item_count(output: &CandidateSnapshot) -> usize {
        output.len()
    }
}

impl<F: FileStore + 'static> RefreshSource for FolderIndexBuilder<F> {
    type Output = FolderIndex;

    const NAME: &'static str = "folders";

    fn build(&self) -> impl Future<Output = Result<FolderIndex>> + Send {
        FolderIndexBuilder::build(self)
    }

    fn item_count(output: &FolderIndex) -> usize {
        output.len()
    }
}

/// How a refresh cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new value was published.
    Published {
        /// Items in the published value.
        items: usize,
        /// Attempts it took.
        attempts: u32,
    },
    /// Every attempt failed; the previous value stays published.
    Failed {
        /// Attempts made.
        attempts: u32,
        /// Last error.
        error: String,
    },
    /// Another cycle of the same task was still running.
    Skipped,
    /// Shutdown was signalled mid-cycle.
    Cancelled,
}

/// Clears the busy flag when dropped, even if the cycle future is dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Resolves once shutdown is signalled or the sender is gone.
async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Periodic refresh of one shared value.
pub struct RefreshTask<S: RefreshSource> {
    source: Arc<S>,
    cell: Arc<SnapshotCell<S::Output>>,
    interval: Duration,
    retry: RetryPolicy,
    busy: Arc<AtomicBool>,
}

impl<S: RefreshSource> Clone for RefreshTask<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            cell: Arc::clone(&self.cell),
            interval: self.interval,
            retry: self.retry,
            busy: Arc::clone(&self.busy),
        }
    }
}

impl<S: RefreshSource> RefreshTask<S> {
    /// Creates a task publishing into `cell` every `interval`.
    #[must_use]
    pub fn new(source: S, cell: Arc<SnapshotCell<S::Output>>, interval: Duration) -> Self {
        Self {
            source: Arc::new(source),
            cell,
            interval,
            retry: RetryPolicy::default(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the refresh interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true while a cycle is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Builds once and publishes on success, without retrying.
    ///
    /// Returns the number of items published.
    ///
    /// # Errors
    ///
    /// Returns the build error; the cell is left untouched.
    pub async fn refresh_once(&self) -> Result<usize> {
        let start = Instant::now();
        let result = self.source.build().await;

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::counter!("refresh_total", "source" => S::NAME, "status" => status).increment(1);
        metrics::histogram!("refresh_duration_ms", "source" => S::NAME)
            .record(start.elapsed().as_secs_f64() * 1000.0);

        let output = result?;
        let items = S::item_count(&output);
        self.cell.replace(output);
        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!("snapshot_items", "source" => S::NAME).set(items as f64);
        Ok(items)
    }

    /// Runs one cycle: build, retrying per policy, and publish.
    ///
    /// Returns [`RefreshOutcome::Skipped`] immediately if another cycle of
    /// this task is running.
    pub async fn run_cycle(&self, shutdown: &mut watch::Receiver<bool>) -> RefreshOutcome {
        let Some(_guard) = BusyGuard::try_acquire(&self.busy) else {
            tracing::debug!(source = S::NAME, "Previous refresh still running, skipping");
            metrics::counter!("refresh_total", "source" => S::NAME, "status" => "skipped")
                .increment(1);
            return RefreshOutcome::Skipped;
        };

        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            let result = tokio::select! {
                result = self.refresh_once() => result,
                () = shutdown_signalled(shutdown) => return RefreshOutcome::Cancelled,
            };

            let error = match result {
                Ok(items) => {
                    tracing::info!(source = S::NAME, items, attempts = attempt, "Refresh published");
                    return RefreshOutcome::Published {
                        items,
                        attempts: attempt,
                    };
                },
                Err(e) => e,
            };

            let Some(delay) = self.retry.delay_for(&error, attempt) else {
                tracing::error!(
                    source = S::NAME,
                    attempts = attempt,
                    transient = error.is_transient(),
                    error = %error,
                    "Refresh failed, keeping previous value"
                );
                return RefreshOutcome::Failed {
                    attempts: attempt,
                    error: error.to_string(),
                };
            };
            tracing::warn!(
                source = S::NAME,
                attempt,
                retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "Refresh failed, retrying"
            );

            tokio::select! {
                () = tokio::time::sleep(delay) => {},
                () = shutdown_signalled(shutdown) => return RefreshOutcome::Cancelled,
            }
        }
    }

    /// Spawns the refresh loop on the current runtime.
    #[must_use]
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Ticks every interval (first tick immediately) until shutdown.
    ///
    /// Each cycle runs in its own task so a long retry sequence never
    /// delays the loop's reaction to shutdown.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight: Option<JoinHandle<RefreshOutcome>> = None;

        tracing::info!(
            source = S::NAME,
            interval_secs = self.interval.as_secs(),
            "Refresh loop started"
        );
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.is_busy() {
                        tracing::debug!(source = S::NAME, "Tick while refresh in flight, skipping");
                        continue;
                    }
                    let task = self.clone();
                    let mut cycle_shutdown = shutdown.clone();
                    in_flight = Some(tokio::spawn(async move {
                        task.run_cycle(&mut cycle_shutdown).await
                    }));
                },
                () = shutdown_signalled(&mut shutdown) => break,
            }
        }

        if let Some(handle) = in_flight {
            if let Err(e) = handle.await {
                tracing::warn!(source = S::NAME, error = %e, "Refresh cycle ended abnormally");
            }
        }
        tracing::info!(source = S::NAME, "Refresh loop stopped");
    }
}
