use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::info;

use super::failure::Failure;
use super::listeners::ListenerRegistry;
use super::record::{JobFields, JobRecord, OutputSettings};
use super::state::{JobState, TransitionPolicy};
use super::sync::{SyncStatus, SyncTask};
use crate::error::JobError;
use crate::store::{IdGenerator, RemoteStore, UuidGenerator};

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60);

/// Per-job behavior knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    /// Time between two polls of the remote record.
    pub sync_interval: Duration,
    /// Start polling as soon as the first listener is registered.
    pub auto_start_sync: bool,
    pub transition_policy: TransitionPolicy,
    /// Settings used when a record carries none.
    pub default_settings: OutputSettings,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            sync_interval: DEFAULT_SYNC_INTERVAL,
            auto_start_sync: true,
            transition_policy: TransitionPolicy::default(),
            default_settings: OutputSettings::default(),
        }
    }
}

/// Local mirror of one render job held by the render API.
///
/// Cloning is cheap and every clone refers to the same job. The background
/// sync task only keeps a weak reference, so dropping the last clone stops it.
pub struct RenderJob<S> {
    pub(super) inner: Arc<Inner<S>>,
}

pub(super) struct Inner<S> {
    pub(super) fields: Mutex<JobFields>,
    pub(super) store: S,
    pub(super) config: JobConfig,
    pub(super) removed: AtomicBool,
    pub(super) listeners: Mutex<ListenerRegistry<RenderJob<S>>>,
    pub(super) sync: Mutex<Option<SyncTask>>,
    pub(super) sync_status: Mutex<SyncStatus>,
}

pub(super) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S> Clone for RenderJob<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for RenderJob<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = lock(&self.inner.fields);
        f.debug_struct("RenderJob")
            .field("id", &fields.id)
            .field("state", &fields.state)
            .finish_non_exhaustive()
    }
}

impl<S: RemoteStore + 'static> RenderJob<S> {
    /// Creates a job from an optional record, minting a UUID when it has no id.
    pub fn new(record: Option<JobRecord>, store: S, config: JobConfig) -> Result<Self, JobError> {
        Self::with_id_generator(record, store, config, &UuidGenerator)
    }

    pub fn with_id_generator(
        record: Option<JobRecord>,
        store: S,
        config: JobConfig,
        ids: &dyn IdGenerator,
    ) -> Result<Self, JobError> {
        let mut record = record.unwrap_or_default();
        let id = record
            .id
            .take()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| ids.generate());
        let fields = JobFields::from_record(record, id, &config.default_settings)?;

        Ok(Self {
            inner: Arc::new(Inner {
                fields: Mutex::new(fields),
                store,
                config,
                removed: AtomicBool::new(false),
                listeners: Mutex::new(ListenerRegistry::default()),
                sync: Mutex::new(None),
                sync_status: Mutex::new(SyncStatus::default()),
            }),
        })
    }

    pub fn id(&self) -> String {
        lock(&self.inner.fields).id.clone()
    }

    pub fn state(&self) -> JobState {
        lock(&self.inner.fields).state
    }

    pub fn error_message(&self) -> Option<String> {
        lock(&self.inner.fields).error_message.clone()
    }

    /// Snapshot of every field.
    pub fn fields(&self) -> JobFields {
        lock(&self.inner.fields).clone()
    }

    pub fn config(&self) -> &JobConfig {
        &self.inner.config
    }

    pub fn is_removed(&self) -> bool {
        self.inner.removed.load(Ordering::Acquire)
    }

    pub fn serialize(&self) -> JobRecord {
        lock(&self.inner.fields).to_record()
    }

    /// Replaces every field from `record`, applying defaults for empty values.
    ///
    /// The id never changes: a record without one keeps the current id, a
    /// record with a different one is rejected.
    pub fn deserialize(&self, record: JobRecord) -> Result<&Self, JobError> {
        self.ensure_active()?;
        let mut fields = lock(&self.inner.fields);
        let id = match record.id.as_deref() {
            None | Some("") => fields.id.clone(),
            Some(id) if id == fields.id => fields.id.clone(),
            Some(other) => {
                return Err(JobError::Validation(format!(
                    "record id `{other}` does not match job `{}`",
                    fields.id
                )));
            }
        };
        *fields = JobFields::from_record(record, id, &self.inner.config.default_settings)?;
        Ok(self)
    }

    /// Marks the render as started.
    pub async fn prepare(&self) -> Result<&Self, JobError> {
        self.transition(JobState::Rendering, None).await
    }

    /// Marks the render as succeeded.
    pub async fn finish(&self) -> Result<&Self, JobError> {
        self.transition(JobState::Finished, None).await
    }

    /// Marks the render as failed, recording the failure's message.
    pub async fn fail(&self, failure: impl Into<Failure>) -> Result<&Self, JobError> {
        let failure = failure.into();
        self.transition(JobState::Failure, Some(failure.message().to_string()))
            .await
    }

    // The local state is updated before persisting and is kept if the store
    // call fails.
    async fn transition(
        &self,
        to: JobState,
        error_message: Option<String>,
    ) -> Result<&Self, JobError> {
        self.ensure_active()?;
        let record = {
            let mut fields = lock(&self.inner.fields);
            self.inner.config.transition_policy.check(fields.state, to)?;
            info!(job_id = %fields.id, from = %fields.state, to = %to, "job transition");
            fields.state = to;
            if error_message.is_some() {
                fields.error_message = error_message;
            }
            fields.to_record()
        };
        self.inner.store.update(&record).await?;
        Ok(self)
    }

    /// Pushes the current fields to the remote store.
    pub async fn save(&self) -> Result<(), JobError> {
        self.ensure_active()?;
        let record = self.serialize();
        self.inner.store.update(&record).await?;
        Ok(())
    }

    /// Deletes the job remotely. On success polling stops and the job
    /// rejects any further mutation.
    pub async fn remove(&self) -> Result<(), JobError> {
        self.ensure_active()?;
        let id = self.id();
        self.inner.store.remove(&id).await?;
        self.inner.removed.store(true, Ordering::Release);
        self.stop_sync();
        info!(job_id = %id, "job removed");
        Ok(())
    }

    /// Registers `callback` for when the job reaches `state`.
    ///
    /// With `auto_start_sync` this also starts polling if it is not running.
    /// If polling cannot start the callback is not registered.
    pub fn on<F>(&self, state: JobState, callback: F) -> Result<(), JobError>
    where
        F: Fn(Option<&str>, &RenderJob<S>) + Send + Sync + 'static,
    {
        self.ensure_active()?;
        if self.inner.config.auto_start_sync {
            self.start_sync()?;
        }
        lock(&self.inner.listeners).register(state, Arc::new(callback));
        Ok(())
    }

    /// Calls the listeners registered for `state`, in registration order.
    pub fn dispatch(&self, state: JobState) {
        let listeners = lock(&self.inner.listeners).for_state(state);
        if listeners.is_empty() {
            return;
        }
        let error_message = self.error_message();
        for listener in listeners {
            listener(error_message.as_deref(), self);
        }
    }

    pub(super) fn ensure_active(&self) -> Result<(), JobError> {
        if self.is_removed() {
            return Err(JobError::Removed(self.id()));
        }
        Ok(())
    }
}
