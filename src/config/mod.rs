use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::alert::{SearchBackend, ZabbixDefaults};
use crate::error::Error as AppError;

mod defaults;
mod duration;
mod env;
mod raw;

use duration::HumantimeDuration;

const MAX_TRIGGER_PRIORITY: u8 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen: SocketAddr,
    pub basic_auth: BasicAuth,
    pub zabbix: ZabbixSettings,
    pub search: SearchSettings,
    pub health_timeout: Duration,
}

/// Credentials operators use against the alert routes.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Clone)]
pub struct ZabbixSettings {
    pub url: Url,
    pub token: SecretString,
    pub host_group_id: String,
    pub interface_port: String,
    pub trigger_priority: u8,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

/// Log-search backend the generated items query.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub url: Url,
    pub username: String,
    pub password: SecretString,
}

impl Config {
    /// Load configuration from a file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be read, parsed,
    /// when environment overrides are invalid, or when the resulting values
    /// fail validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut raw = raw::load(path).map_err(AppError::from)?;
        raw.apply_env_overrides().map_err(AppError::from)?;
        raw.validate_and_build()
    }
}

impl ZabbixSettings {
    #[must_use]
    pub fn defaults(&self) -> ZabbixDefaults {
        ZabbixDefaults {
            host_group_id: self.host_group_id.clone(),
            interface_port: self.interface_port.clone(),
            trigger_priority: self.trigger_priority,
        }
    }
}

impl SearchSettings {
    /// Endpoint as embedded in item URLs, without a trailing slash.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }

    #[must_use]
    pub fn backend(&self) -> SearchBackend {
        SearchBackend {
            endpoint: self.endpoint(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}
