use anyhow::{Result, Context as AnyhowContext};
use serde::{Serialize, Deserialize};
use std::fs;
use std::time::Duration;

pub const REDIS_URL_ENV: &str = "SAAS_EDITOR_REDIS_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub runner: RunnerSettings,
    pub redis: RedisSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunnerSettings {
    /// Capacity of the command channel between dispatchers and the runner.
    pub queue_capacity: usize,
    /// Used when an action has no `actionConfiguration.timeoutInMillisecond`.
    pub run_timeout_ms: u64,
    /// Executor used for plugins without a dedicated one (e.g. "echo").
    pub default_executor: Option<String>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            run_timeout_ms: 10_000,
            default_executor: None,
        }
    }
}

impl RunnerSettings {
    pub fn run_timeout(&self) -> Duration {
        Duration::from_millis(self.run_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RedisSettings {
    pub url: Option<String>,
    pub prefix: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: None,
            prefix: "saas".to_string(),
        }
    }
}

impl Settings {
    /// Overrides taken from the environment; `lookup` is `std::env::var` outside tests.
    pub fn apply_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(REDIS_URL_ENV).filter(|u| !u.is_empty()) {
            self.redis.url = Some(url);
        }
        self
    }
}

pub fn load_settings_from_yaml(file_path: &str) -> Result<Settings> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read settings file from {}", file_path))?;

    let settings: Settings = serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Failed to deserialize settings from {}", file_path))?;

    Ok(settings)
}
