//! Client-side mirror of a render job held by a remote render API.
//!
//! A [`RenderJob`] owns the job's fields, persists local transitions through a
//! [`RemoteStore`], and polls the store to pick up transitions made elsewhere,
//! notifying listeners registered per [`JobState`].

pub mod cli;
pub mod config;
pub mod error;
pub mod job;
pub mod store;
pub mod ui;

pub use config::RenderJobConfig;
pub use error::{JobError, StoreError};
pub use job::{Failure, JobConfig, JobRecord, JobState, RenderJob, TickOutcome};
pub use store::{HttpStore, IdGenerator, RemoteStore, UuidGenerator};
