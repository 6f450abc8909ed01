//! In-memory store and id generator shared by the job tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::record::JobRecord;
use crate::error::StoreError;
use crate::store::{IdGenerator, RemoteStore};

#[derive(Default)]
pub(crate) struct MockStore {
    remote: Mutex<Option<JobRecord>>,
    updates: Mutex<Vec<JobRecord>>,
    removed: Mutex<Vec<String>>,
    gets: AtomicUsize,
    get_error: Mutex<Option<StoreError>>,
    update_error: Mutex<Option<StoreError>>,
    remove_error: Mutex<Option<StoreError>>,
}

impl MockStore {
    pub(crate) fn set_remote(&self, record: JobRecord) {
        *self.remote.lock().unwrap() = Some(record);
    }

    pub(crate) fn fail_gets_with(&self, err: StoreError) {
        *self.get_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn fail_updates_with(&self, err: StoreError) {
        *self.update_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn fail_removes_with(&self, err: StoreError) {
        *self.remove_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn clear_failures(&self) {
        self.get_error.lock().unwrap().take();
        self.update_error.lock().unwrap().take();
        self.remove_error.lock().unwrap().take();
    }

    pub(crate) fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub(crate) fn updates(&self) -> Vec<JobRecord> {
        self.updates.lock().unwrap().clone()
    }

    pub(crate) fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

impl RemoteStore for MockStore {
    async fn get(&self, id: &str) -> Result<JobRecord, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.get_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.remote
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, record: &JobRecord) -> Result<(), StoreError> {
        if let Some(err) = self.update_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.updates.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        if let Some(err) = self.remove_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.removed.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

/// Hands out `job-1`, `job-2`, ...
#[derive(Default)]
pub(crate) struct SequentialIds {
    next: AtomicUsize,
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        format!("job-{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
