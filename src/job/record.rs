//! Plain record exchanged with the render API and its normalized in-memory form.
//!
//! [`JobRecord`] is the wire shape: every field optional, camelCase keys.
//! [`JobFields`] is what a job actually holds once defaults have been applied.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::state::JobState;
use crate::error::JobError;

pub const DEFAULT_TEMPLATE: &str = "template.aep";
pub const DEFAULT_COMPOSITION: &str = "comp1";
pub const DEFAULT_JOB_TYPE: &str = "default";
pub const DEFAULT_OUTPUT_MODULE: &str = "h264";
pub const DEFAULT_OUTPUT_EXT: &str = "mp4";

/// Serialized form of a render job.
///
/// Incoming records may carry the id as `id`, `uid` or both; a non-empty
/// `id` wins. Only `id` is written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireRecord")]
pub struct JobRecord {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub state: Option<String>,
    pub assets: Option<Vec<Asset>>,
    pub template: Option<String>,
    pub settings: Option<OutputSettings>,
    pub composition: Option<String>,
    pub actions: Option<Vec<Action>>,
    pub error_message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    id: Option<String>,
    uid: Option<String>,
    #[serde(rename = "type")]
    job_type: Option<String>,
    state: Option<String>,
    assets: Option<Vec<Asset>>,
    template: Option<String>,
    settings: Option<OutputSettings>,
    composition: Option<String>,
    actions: Option<Vec<Action>>,
    error_message: Option<String>,
}

impl From<WireRecord> for JobRecord {
    fn from(wire: WireRecord) -> Self {
        Self {
            id: wire.id.filter(|id| !id.is_empty()).or(wire.uid),
            job_type: wire.job_type,
            state: wire.state,
            assets: wire.assets,
            template: wire.template,
            settings: wire.settings,
            composition: wire.composition,
            actions: wire.actions,
            error_message: wire.error_message,
        }
    }
}

/// An input the renderer pulls in (footage, image, script...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub src: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A post-processing step run after the render completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub module: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Output configuration handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSettings {
    #[serde(default)]
    pub output_module: String,
    #[serde(default)]
    pub output_ext: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutputSettings {
    pub fn new(output_module: impl Into<String>, output_ext: impl Into<String>) -> Self {
        Self {
            output_module: output_module.into(),
            output_ext: output_ext.into(),
            extra: Map::new(),
        }
    }

    // Empty module or extension falls back to the configured default.
    fn or_defaults(mut self, defaults: &OutputSettings) -> Self {
        if self.output_module.is_empty() {
            self.output_module = defaults.output_module.clone();
        }
        if self.output_ext.is_empty() {
            self.output_ext = defaults.output_ext.clone();
        }
        self
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_MODULE, DEFAULT_OUTPUT_EXT)
    }
}

/// Fully-populated job fields.
#[derive(Debug, Clone, PartialEq)]
pub struct JobFields {
    pub id: String,
    pub job_type: String,
    pub state: JobState,
    pub assets: Vec<Asset>,
    pub template: String,
    pub settings: OutputSettings,
    pub composition: String,
    pub actions: Vec<Action>,
    pub error_message: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl JobFields {
    /// Builds fields from a record, replacing absent or empty values with defaults.
    ///
    /// The id is resolved by the caller since only construction may mint one.
    pub fn from_record(
        record: JobRecord,
        id: String,
        default_settings: &OutputSettings,
    ) -> Result<Self, JobError> {
        let state = match non_empty(record.state) {
            Some(s) => s.parse()?,
            None => JobState::default(),
        };

        Ok(Self {
            id,
            job_type: non_empty(record.job_type).unwrap_or_else(|| DEFAULT_JOB_TYPE.to_string()),
            state,
            assets: record.assets.unwrap_or_default(),
            template: non_empty(record.template).unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
            settings: record
                .settings
                .map(|s| s.or_defaults(default_settings))
                .unwrap_or_else(|| default_settings.clone()),
            composition: non_empty(record.composition)
                .unwrap_or_else(|| DEFAULT_COMPOSITION.to_string()),
            actions: record.actions.unwrap_or_default(),
            error_message: non_empty(record.error_message),
        })
    }

    pub fn to_record(&self) -> JobRecord {
        JobRecord {
            id: Some(self.id.clone()),
            job_type: Some(self.job_type.clone()),
            state: Some(self.state.to_string()),
            assets: Some(self.assets.clone()),
            template: Some(self.template.clone()),
            settings: Some(self.settings.clone()),
            composition: Some(self.composition.clone()),
            actions: Some(self.actions.clone()),
            error_message: self.error_message.clone(),
        }
    }
}
