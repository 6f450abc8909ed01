use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// Lifecycle of a render job on the server.
///
/// Jobs flow: QUEUED → RENDERING → FINISHED | FAILURE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[default]
    Queued,
    Rendering,
    Finished,
    Failure,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Rendering => "rendering",
            JobState::Finished => "finished",
            JobState::Failure => "failure",
        }
    }

    /// No further transition is expected once a job is finished or failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Finished | JobState::Failure)
    }

    /// Whether `self → to` is one of the documented lifecycle edges.
    pub fn can_transition_to(&self, to: JobState) -> bool {
        matches!(
            (self, to),
            (JobState::Queued, JobState::Rendering)
                | (JobState::Queued, JobState::Failure)
                | (JobState::Rendering, JobState::Finished)
                | (JobState::Rendering, JobState::Failure)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobState::Queued),
            "rendering" => Ok(JobState::Rendering),
            "finished" => Ok(JobState::Finished),
            "failure" => Ok(JobState::Failure),
            other => Err(JobError::Validation(format!("unknown job state `{other}`"))),
        }
    }
}

/// How local transitions (`prepare`, `finish`, `fail`) are checked.
///
/// Remote resynchronization ignores the policy: whatever the server reports wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Every transition call overwrites the state.
    #[default]
    Permissive,
    /// Only documented edges are allowed.
    Strict,
}

impl TransitionPolicy {
    pub fn check(&self, from: JobState, to: JobState) -> Result<(), JobError> {
        match self {
            TransitionPolicy::Permissive => Ok(()),
            TransitionPolicy::Strict if from.can_transition_to(to) => Ok(()),
            TransitionPolicy::Strict => Err(JobError::InvalidTransition { from, to }),
        }
    }
}
