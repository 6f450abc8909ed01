mod entity;
mod failure;
mod listeners;
mod record;
mod state;
mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use entity::{DEFAULT_SYNC_INTERVAL, JobConfig, RenderJob};
pub use failure::Failure;
pub use listeners::{Listener, ListenerRegistry};
pub use record::{
    Action, Asset, DEFAULT_COMPOSITION, DEFAULT_JOB_TYPE, DEFAULT_OUTPUT_EXT,
    DEFAULT_OUTPUT_MODULE, DEFAULT_TEMPLATE, JobFields, JobRecord, OutputSettings,
};
pub use state::{JobState, TransitionPolicy};
pub use sync::{SyncFailure, TickOutcome};
