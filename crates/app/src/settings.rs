//! Handles settings for the application. Configuration is read from a TOML
//! file (`config/budgetify.toml` unless `--config` says otherwise, optional)
//! and from `BUDGETIFY__*` environment variables, the latter taking
//! precedence, e.g. `BUDGETIFY__SERVER__PORT=8080`.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 3000
//! database = { sqlite = "budgetify.db" }
//!
//! [alerts]
//! timeout_secs = 10
//!
//! [alerts.telegram]
//! token = "123:abc"
//!
//! [alerts.email]
//! service_id = "service"
//! template_id = "template"
//! public_key = "public"
//! ```

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use notifier::EmailSettings;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct Alerts {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub email: Option<EmailSettings>,
    pub telegram: Option<Telegram>,
}

impl Default for Alerts {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            email: None,
            telegram: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    notifier::DEFAULT_TIMEOUT.as_secs()
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub alerts: Alerts,
}

impl Settings {
    pub fn new(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("BUDGETIFY").separator("__"))
            .build()?
            .try_deserialize()
    }

    #[cfg(test)]
    fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
