use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::scroll::{DEFAULT_COOL_TIME, DEFAULT_SCROLL_MARGIN};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_auto_scroll_cool_time_ms")]
    pub auto_scroll_cool_time_ms: u64,
    #[serde(default = "default_auto_scroll_margin")]
    pub auto_scroll_margin: f64,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_save_progress")]
    pub save_progress: bool,
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_auto_scroll_cool_time_ms() -> u64 {
    DEFAULT_COOL_TIME.as_millis() as u64
}
fn default_auto_scroll_margin() -> f64 {
    DEFAULT_SCROLL_MARGIN
}
fn default_tick_rate_ms() -> u64 {
    100
}
fn default_save_progress() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            theme: default_theme(),
            auto_scroll_cool_time_ms: default_auto_scroll_cool_time_ms(),
            auto_scroll_margin: default_auto_scroll_margin(),
            tick_rate_ms: default_tick_rate_ms(),
            save_progress: default_save_progress(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("repotype")
            .join("config.toml")
    }

    /// Pull out-of-range values back to something usable.
    pub fn normalize(&mut self) {
        if !(0.0..0.5).contains(&self.auto_scroll_margin) {
            self.auto_scroll_margin = default_auto_scroll_margin();
        }
        if self.tick_rate_ms == 0 {
            self.tick_rate_ms = default_tick_rate_ms();
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_request_timeout_secs();
        }
        if self.api_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            self.api_token = None;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn auto_scroll_cool_time(&self) -> Duration {
        Duration::from_millis(self.auto_scroll_cool_time_ms)
    }
}
