use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use datachat_core::ConcurrencyPolicy;
use datachat_engine::{
    InferenceSettings, SnapshotMode, DEFAULT_ANIMATION_PERIOD, DEFAULT_DATASET_FILE,
    DEFAULT_MAILBOX_FILE,
};
use engine_logging::engine_info;
use log::LevelFilter;
use serde::Deserialize;

use crate::cli::Cli;

pub const DEFAULT_CONFIG_FILE: &str = "datachat.ron";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySetting {
    #[default]
    Concurrent,
    Queue,
    Reject,
}

impl From<PolicySetting> for ConcurrencyPolicy {
    fn from(setting: PolicySetting) -> Self {
        match setting {
            PolicySetting::Concurrent => ConcurrencyPolicy::Concurrent,
            PolicySetting::Queue => ConcurrencyPolicy::Queue,
            PolicySetting::Reject => ConcurrencyPolicy::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSetting {
    /// Every row as a JSON array of objects.
    #[default]
    Rows,
    /// Columns, sample rows and per-column statistics.
    Summary,
}

impl From<SnapshotSetting> for SnapshotMode {
    fn from(setting: SnapshotSetting) -> Self {
        match setting {
            SnapshotSetting::Rows => SnapshotMode::Rows,
            SnapshotSetting::Summary => SnapshotMode::Summary,
        }
    }
}

/// Contents of `datachat.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub dataset: PathBuf,
    pub snapshot: SnapshotSetting,
    pub mailbox: PathBuf,
    pub poll_interval_ms: u64,
    pub animation_period_ms: u64,
    pub policy: PolicySetting,
    pub log_file: Option<PathBuf>,
    pub inference: InferenceFileConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(DEFAULT_DATASET_FILE),
            snapshot: SnapshotSetting::default(),
            mailbox: PathBuf::from(DEFAULT_MAILBOX_FILE),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            animation_period_ms: DEFAULT_ANIMATION_PERIOD.as_millis() as u64,
            policy: PolicySetting::default(),
            log_file: None,
            inference: InferenceFileConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferenceFileConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for InferenceFileConfig {
    fn default() -> Self {
        let settings = InferenceSettings::default();
        Self {
            base_url: settings.base_url,
            api_key: settings.api_key,
            model: settings.model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            request_timeout_secs: settings.request_timeout.as_secs(),
        }
    }
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {path:?}"))?;
        Self::parse(&text).with_context(|| format!("parsing config {path:?}"))
    }
}

/// Settings after merging command line, config file and defaults, in that
/// order of precedence.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dataset_path: PathBuf,
    pub snapshot_mode: SnapshotMode,
    pub mailbox_path: PathBuf,
    pub poll_interval: Duration,
    pub animation_period: Duration,
    pub policy: ConcurrencyPolicy,
    pub log_file: Option<PathBuf>,
    pub log_level: LevelFilter,
    pub inference: InferenceSettings,
}

impl AppConfig {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    FileConfig::load(default)?
                } else {
                    FileConfig::default()
                }
            }
        };
        Self::merge(cli, file)
    }

    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        if file.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        if file.animation_period_ms == 0 {
            bail!("animation_period_ms must be greater than zero");
        }

        let inference = InferenceSettings {
            base_url: cli
                .base_url
                .clone()
                .unwrap_or(file.inference.base_url),
            api_key: cli.api_key.clone().or(file.inference.api_key),
            model: cli.model.clone().unwrap_or(file.inference.model),
            temperature: file.inference.temperature,
            max_tokens: file.inference.max_tokens,
            connect_timeout: Duration::from_secs(file.inference.connect_timeout_secs),
            request_timeout: Duration::from_secs(file.inference.request_timeout_secs),
        };

        let config = Self {
            dataset_path: cli.dataset.clone().unwrap_or(file.dataset),
            snapshot_mode: cli.snapshot.unwrap_or(file.snapshot).into(),
            mailbox_path: cli.mailbox.clone().unwrap_or(file.mailbox),
            poll_interval: Duration::from_millis(file.poll_interval_ms),
            animation_period: Duration::from_millis(file.animation_period_ms),
            policy: cli.policy.unwrap_or(file.policy).into(),
            log_file: cli.log_file.clone().or(file.log_file),
            log_level: cli.log_level.into(),
            inference,
        };
        Ok(config)
    }

    /// Log file for a command; each command gets its own so that `chat` and
    /// `input` running side by side do not truncate each other's log.
    pub fn log_file_for(&self, command: &str) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("datachat-{command}.log")))
    }

    pub fn log_summary(&self) {
        engine_info!(
            "Config: dataset={:?} snapshot={:?} mailbox={:?} policy={:?} base_url={} model={} api_key={}",
            self.dataset_path,
            self.snapshot_mode,
            self.mailbox_path,
            self.policy,
            self.inference.base_url,
            self.inference.model,
            if self.inference.api_key.is_some() { "set" } else { "unset" }
        );
    }
}
