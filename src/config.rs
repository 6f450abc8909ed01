//! Configuration loaded from `renderjob.toml`.
//!
//! [`RenderJobConfig`] holds everything configurable. Values missing from the
//! file fall back to defaults, and the environment variables `API_URL`,
//! `API_UPDATE_INTERVAL`, `AE_OUTPUT_MODULE` and `AE_OUTPUT_EXT` take
//! precedence over the file.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::job::{
    DEFAULT_OUTPUT_EXT, DEFAULT_OUTPUT_MODULE, DEFAULT_SYNC_INTERVAL, JobConfig, OutputSettings,
    TransitionPolicy,
};
use crate::store::http::DEFAULT_API_URL;

pub const CONFIG_FILE: &str = "renderjob.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderJobConfig {
    /// Base URL of the render API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Milliseconds between two polls of a job.
    #[serde(default = "default_sync_interval_ms")]
    pub sync_interval_ms: u64,

    #[serde(default = "default_auto_start_sync")]
    pub auto_start_sync: bool,

    #[serde(default)]
    pub transition_policy: TransitionPolicy,

    #[serde(default = "default_output_module")]
    pub output_module: String,

    #[serde(default = "default_output_ext")]
    pub output_ext: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_sync_interval_ms() -> u64 {
    DEFAULT_SYNC_INTERVAL.as_millis() as u64
}

fn default_auto_start_sync() -> bool {
    true
}

fn default_output_module() -> String {
    DEFAULT_OUTPUT_MODULE.to_string()
}

fn default_output_ext() -> String {
    DEFAULT_OUTPUT_EXT.to_string()
}

impl Default for RenderJobConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            sync_interval_ms: default_sync_interval_ms(),
            auto_start_sync: default_auto_start_sync(),
            transition_policy: TransitionPolicy::default(),
            output_module: default_output_module(),
            output_ext: default_output_ext(),
        }
    }
}

impl RenderJobConfig {
    /// Loads `renderjob.toml` from the current directory, then applies the
    /// process environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::from_file(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Reads `path`, or returns the defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid {}", path.display()))?;
        Ok(config)
    }

    /// Rejects values a job cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sync_interval_ms == 0 {
            bail!("sync interval must be greater than zero");
        }
        Ok(())
    }

    /// Overrides fields from environment-style lookups; empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = var("API_URL") {
            self.api_url = url;
        }
        if let Some(interval) = var("API_UPDATE_INTERVAL") {
            self.sync_interval_ms = interval
                .parse()
                .with_context(|| format!("API_UPDATE_INTERVAL is not a number: {interval}"))?;
            self.validate().context("API_UPDATE_INTERVAL")?;
        }
        if let Some(module) = var("AE_OUTPUT_MODULE") {
            self.output_module = module;
        }
        if let Some(ext) = var("AE_OUTPUT_EXT") {
            self.output_ext = ext;
        }
        Ok(())
    }

    pub fn job_config(&self) -> JobConfig {
        JobConfig {
            sync_interval: Duration::from_millis(self.sync_interval_ms),
            auto_start_sync: self.auto_start_sync,
            transition_policy: self.transition_policy,
            default_settings: OutputSettings::new(&self.output_module, &self.output_ext),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = RenderJobConfig::default();
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.sync_interval_ms, 60_000);
        assert!(config.auto_start_sync);
        assert_eq!(config.transition_policy, TransitionPolicy::Permissive);
        assert_eq!(config.output_module, "h264");
        assert_eq!(config.output_ext, "mp4");
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_url = "http://render.internal/api"
            sync_interval_ms = 5000
            transition_policy = "strict"
        "#;
        let config: RenderJobConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_url, "http://render.internal/api");
        assert_eq!(config.sync_interval_ms, 5000);
        assert_eq!(config.transition_policy, TransitionPolicy::Strict);
        assert_eq!(config.output_module, "h264");
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "output_module = \"prores\"\noutput_ext = \"mov\"").unwrap();

        let config = RenderJobConfig::from_file(file.path()).unwrap();
        assert_eq!(config.output_module, "prores");
        assert_eq!(config.output_ext, "mov");
        assert_eq!(config.sync_interval_ms, 60_000);
    }

    #[test]
    fn from_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderJobConfig::from_file(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, RenderJobConfig::default());
    }

    #[test]
    fn from_file_reports_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sync_interval_ms = \"soon\"").unwrap();
        assert!(RenderJobConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("API_UPDATE_INTERVAL", "1500"),
            ("AE_OUTPUT_MODULE", "gif"),
            ("AE_OUTPUT_EXT", ""),
        ]);
        let mut config = RenderJobConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.sync_interval_ms, 1500);
        assert_eq!(config.output_module, "gif");
        assert_eq!(config.output_ext, "mp4");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn invalid_interval_is_an_error() {
        let mut config = RenderJobConfig::default();
        let result = config.apply_env(|key| (key == "API_UPDATE_INTERVAL").then(|| "1m".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn zero_interval_from_env_is_rejected() {
        let mut config = RenderJobConfig::default();
        let result = config.apply_env(|key| (key == "API_UPDATE_INTERVAL").then(|| "0".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn zero_interval_in_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sync_interval_ms = 0").unwrap();
        let err = RenderJobConfig::from_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("greater than zero"));
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(RenderJobConfig::default().validate().is_ok());
        let config = RenderJobConfig {
            sync_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn job_config_carries_interval_and_settings() {
        let config = RenderJobConfig {
            sync_interval_ms: 250,
            output_module: "prores".into(),
            ..Default::default()
        };
        let job = config.job_config();
        assert_eq!(job.sync_interval, Duration::from_millis(250));
        assert_eq!(job.default_settings, OutputSettings::new("prores", "mp4"));
        assert!(job.auto_start_sync);
    }
}
