//! Collaborators a [`RenderJob`](crate::job::RenderJob) talks to.
//!
//! [`RemoteStore`] is the render API seen as get/update/remove by id;
//! [`IdGenerator`] mints ids for jobs created locally.

pub mod http;

use std::future::Future;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::StoreError;
use crate::job::JobRecord;

pub use http::HttpStore;

/// Remote persistence for job records.
pub trait RemoteStore: Send + Sync {
    fn get(&self, id: &str) -> impl Future<Output = Result<JobRecord, StoreError>> + Send;

    fn update(&self, record: &JobRecord) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn remove(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl<T: RemoteStore> RemoteStore for Arc<T> {
    fn get(&self, id: &str) -> impl Future<Output = Result<JobRecord, StoreError>> + Send {
        (**self).get(id)
    }

    fn update(&self, record: &JobRecord) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).update(record)
    }

    fn remove(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).remove(id)
    }
}

pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random v4 UUIDs in their compact (hyphen-less) form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
