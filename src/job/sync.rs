//! Polling loop that keeps a [`RenderJob`] in step with the remote store.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use super::entity::{Inner, RenderJob, lock};
use super::record::JobFields;
use super::state::JobState;
use crate::error::JobError;
use crate::store::RemoteStore;

/// What a single poll observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Unchanged(JobState),
    Changed { from: JobState, to: JobState },
}

/// A poll that failed. Failures never stop the loop.
#[derive(Debug, Clone)]
pub struct SyncFailure {
    pub at: DateTime<Utc>,
    pub error: Arc<JobError>,
}

#[derive(Debug, Default)]
pub(super) struct SyncStatus {
    failures: u64,
    last_failure: Option<SyncFailure>,
}

/// Running poll task; aborted when dropped.
pub(super) struct SyncTask {
    handle: JoinHandle<()>,
}

impl Drop for SyncTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl<S: RemoteStore + 'static> RenderJob<S> {
    /// Fetches the remote record and, if its state differs, adopts it and
    /// dispatches the listeners for the new state.
    pub async fn tick(&self) -> Result<TickOutcome, JobError> {
        self.ensure_active()?;
        let id = self.id();
        let remote = self.inner.store.get(&id).await?;
        let remote = JobFields::from_record(remote, id, &self.inner.config.default_settings)?;

        let from = {
            let mut fields = lock(&self.inner.fields);
            let from = fields.state;
            if from == remote.state {
                debug!(job_id = %fields.id, state = %from, "job state unchanged");
                return Ok(TickOutcome::Unchanged(from));
            }
            *fields = remote;
            from
        };

        let to = self.state();
        info!(job_id = %self.id(), from = %from, to = %to, "remote job state changed");
        self.dispatch(to);
        Ok(TickOutcome::Changed { from, to })
    }

    /// Starts the poll task. Returns `false` if it was already running.
    ///
    /// A zero `sync_interval` is rejected before anything is spawned.
    pub fn start_sync(&self) -> Result<bool, JobError> {
        self.ensure_active()?;
        let period = self.inner.config.sync_interval;
        if period.is_zero() {
            return Err(JobError::Validation(
                "sync interval must be greater than zero".to_string(),
            ));
        }
        let mut sync = lock(&self.inner.sync);
        if sync.as_ref().is_some_and(|task| !task.handle.is_finished()) {
            return Ok(false);
        }

        let runtime = Handle::try_current().map_err(|_| JobError::NoRuntime)?;
        let weak = Arc::downgrade(&self.inner);
        info!(job_id = %self.id(), interval_ms = period.as_millis() as u64, "starting job sync");

        *sync = Some(SyncTask {
            handle: runtime.spawn(poll(weak, period)),
        });
        Ok(true)
    }

    /// Stops the poll task. Returns `false` if none was running.
    pub fn stop_sync(&self) -> bool {
        let stopped = lock(&self.inner.sync).take().is_some();
        if stopped {
            debug!(job_id = %self.id(), "stopped job sync");
        }
        stopped
    }

    pub fn is_syncing(&self) -> bool {
        lock(&self.inner.sync)
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Most recent failed poll, if any.
    pub fn last_sync_error(&self) -> Option<SyncFailure> {
        lock(&self.inner.sync_status).last_failure.clone()
    }

    /// Number of failed polls since the job was created.
    pub fn sync_failures(&self) -> u64 {
        lock(&self.inner.sync_status).failures
    }

    fn record_sync_failure(&self, error: JobError) {
        warn!(job_id = %self.id(), error = %error, "job sync failed");
        let mut status = lock(&self.inner.sync_status);
        status.failures += 1;
        status.last_failure = Some(SyncFailure {
            at: Utc::now(),
            error: Arc::new(error),
        });
    }
}

async fn poll<S: RemoteStore + 'static>(weak: Weak<Inner<S>>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(inner) = weak.upgrade() else {
            break;
        };
        let job = RenderJob { inner };
        if let Err(error) = job.tick().await {
            job.record_sync_failure(error);
        }
    }
}
