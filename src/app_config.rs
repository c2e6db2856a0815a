use crate::domain::DeviceQuery;
use config::{Config, Environment};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    core: Core,
    simulators: Simulators,
    device: DeviceSelection,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppConfigError> {
        Self::load_from("config")
    }

    /// Layers `<name>`, the optional `<name>_local` and environment variables such as
    /// `SIMULATORS__APPLESIMUTILS_PATH`.
    pub fn load_from(name: &str) -> Result<Self, AppConfigError> {
        Self::load_with_environment(name, Environment::default().separator("__"))
    }

    fn load_with_environment(name: &str, environment: Environment) -> Result<Self, AppConfigError> {
        let config = Config::builder()
            .add_source(config::File::with_name(name).required(true))
            .add_source(config::File::with_name(&format!("{}_local", name)).required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn simulators(&self) -> &Simulators {
        &self.simulators
    }

    pub fn device_query(&self) -> &DeviceQuery {
        &self.device.query
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Core {
    log_level: String,
}

impl Default for Core {
    fn default() -> Self {
        Core {
            log_level: "info".to_string(),
        }
    }
}

impl Core {
    pub fn log_level(&self) -> Result<Level, AppConfigError> {
        Level::from_str(&self.log_level).map_err(|_| AppConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}

#[derive(Debug, Deserialize)]
pub struct Simulators {
    applesimutils_path: String,
    xcrun_path: String,
    #[serde(with = "humantime_serde")]
    command_timeout: Duration,
}

impl Simulators {
    pub fn applesimutils_path(&self) -> &str {
        &self.applesimutils_path
    }

    pub fn xcrun_path(&self) -> &str {
        &self.xcrun_path
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }
}

#[derive(Debug, Deserialize)]
struct DeviceSelection {
    query: DeviceQuery,
}

#[derive(Error, Debug)]
pub enum AppConfigError {
    #[error("unable to load the configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                core: Core::default(),
                simulators: Simulators {
                    applesimutils_path: "applesimutils".to_string(),
                    xcrun_path: "/usr/bin/xcrun".to_string(),
                    command_timeout: Duration::from_secs(5),
                },
                device: DeviceSelection {
                    query: DeviceQuery::from("iPhone X"),
                },
            },
        }
    }

    pub fn applesimutils_path(mut self, path: &str) -> Self {
        self.config.simulators.applesimutils_path = path.to_string();
        self
    }

    pub fn xcrun_path(mut self, path: &str) -> Self {
        self.config.simulators.xcrun_path = path.to_string();
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.simulators.command_timeout = timeout;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
