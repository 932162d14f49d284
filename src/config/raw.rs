use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use serde_with::serde_as;
use url::Url;

use crate::Result;
use crate::error::ConfigError;

use super::defaults::{
    default_connect_timeout, default_health_timeout, default_host_group_id,
    default_interface_port, default_request_timeout, default_server_addr, default_server_port,
    default_trigger_priority,
};
use super::env::{env_duration, env_parse, env_string};
use super::{
    BasicAuth, Config, HumantimeDuration, MAX_TRIGGER_PRIORITY, SearchSettings, ZabbixSettings,
};

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let builder = ::config::Config::builder()
        .add_source(::config::File::from(path.as_ref()).required(false))
        .add_source(
            ::config::Environment::with_prefix("LOGALERT")
                .separator("__")
                .try_parsing(true),
        );
    finish(builder)
}

#[cfg(test)]
pub(super) fn load_toml(text: &str) -> std::result::Result<RawConfig, ConfigError> {
    let builder = ::config::Config::builder()
        .add_source(::config::File::from_str(text, ::config::FileFormat::Toml));
    finish(builder)
}

fn finish(
    builder: ::config::ConfigBuilder<::config::builder::DefaultState>,
) -> std::result::Result<RawConfig, ConfigError> {
    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) server: RawServer,
    #[serde(default)]
    pub(super) basic: RawBasic,
    #[serde(default)]
    pub(super) zabbix: RawZabbix,
    #[serde(default)]
    pub(super) elasticsearch: RawSearch,
    #[serde(default)]
    pub(super) health: RawHealth,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawServer {
    #[serde(default = "default_server_addr")]
    pub(super) addr: String,
    #[serde(default = "default_server_port")]
    pub(super) port: u16,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawBasic {
    pub(super) username: Option<String>,
    pub(super) password: Option<String>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawZabbix {
    pub(super) url: Option<String>,
    pub(super) token: Option<String>,
    #[serde(default = "default_host_group_id")]
    pub(super) host_group_id: String,
    #[serde(default = "default_interface_port")]
    pub(super) interface_port: String,
    #[serde(default = "default_trigger_priority")]
    pub(super) trigger_priority: u8,
    #[serde(default = "default_request_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) request_timeout: Duration,
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) connect_timeout: Duration,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawSearch {
    pub(super) url: Option<String>,
    #[serde(default)]
    pub(super) username: String,
    #[serde(default)]
    pub(super) password: String,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawHealth {
    #[serde(default = "default_health_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) timeout: Duration,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(addr) = env_string("SERVER_ADDR")? {
            self.server.addr = addr;
        }
        if let Some(port) = env_parse::<u16>("SERVER_PORT")? {
            self.server.port = port;
        }
        if let Some(username) = env_string("BASIC_AUTH_USERNAME")? {
            self.basic.username = Some(username);
        }
        if let Some(password) = env_string("BASIC_AUTH_PASSWORD")? {
            self.basic.password = Some(password);
        }
        if let Some(url) = env_string("ZBX_URL")? {
            self.zabbix.url = Some(url);
        }
        if let Some(token) = env_string("ZBX_TOKEN")? {
            self.zabbix.token = Some(token);
        }
        if let Some(group) = env_string("ZBX_HOST_GROUP_ID")? {
            self.zabbix.host_group_id = group;
        }
        if let Some(port) = env_string("ZBX_INTERFACE_PORT")? {
            self.zabbix.interface_port = port;
        }
        if let Some(priority) = env_parse::<u8>("ZBX_TRIGGER_PRIORITY")? {
            self.zabbix.trigger_priority = priority;
        }
        if let Some(timeout) = env_duration("ZBX_TIMEOUT")? {
            self.zabbix.request_timeout = timeout;
        }
        if let Some(timeout) = env_duration("ZBX_CONNECT_TIMEOUT")? {
            self.zabbix.connect_timeout = timeout;
        }
        if let Some(url) = env_string("ES_URL")? {
            self.elasticsearch.url = Some(url);
        }
        if let Some(username) = env_string("ES_USERNAME")? {
            self.elasticsearch.username = username;
        }
        if let Some(password) = env_string("ES_PASSWORD")? {
            self.elasticsearch.password = password;
        }
        if let Some(timeout) = env_duration("HEALTH_TIMEOUT")? {
            self.health.timeout = timeout;
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        let ip = self
            .server
            .addr
            .trim()
            .parse::<IpAddr>()
            .map_err(|err| ConfigError::InvalidField {
                field: "server.addr",
                message: err.to_string(),
            })?;
        let listen = SocketAddr::new(ip, self.server.port);

        let username = non_empty("basic.username", self.basic.username)?;
        let password = non_empty("basic.password", self.basic.password)?;

        let zabbix_url = parse_url("zabbix.url", self.zabbix.url)?;
        let token = non_empty("zabbix.token", self.zabbix.token)?;
        numeric("zabbix.host_group_id", &self.zabbix.host_group_id)?;
        numeric("zabbix.interface_port", &self.zabbix.interface_port)?;
        if self.zabbix.trigger_priority > MAX_TRIGGER_PRIORITY {
            return Err(ConfigError::InvalidField {
                field: "zabbix.trigger_priority",
                message: format!(
                    "expected between 0 and {MAX_TRIGGER_PRIORITY}, got {}",
                    self.zabbix.trigger_priority
                ),
            }
            .into());
        }
        positive("zabbix.request_timeout", self.zabbix.request_timeout)?;
        positive("zabbix.connect_timeout", self.zabbix.connect_timeout)?;

        let search_url = parse_url("elasticsearch.url", self.elasticsearch.url)?;
        // the endpoint is copied into every item URL and every alert listing
        if !search_url.username().is_empty() || search_url.password().is_some() {
            return Err(ConfigError::InvalidField {
                field: "elasticsearch.url",
                message: "credentials belong in elasticsearch.username and \
                          elasticsearch.password, not in the URL"
                    .to_string(),
            }
            .into());
        }
        positive("health.timeout", self.health.timeout)?;

        Ok(Config {
            listen,
            basic_auth: BasicAuth {
                username,
                password: password.into(),
            },
            zabbix: ZabbixSettings {
                url: zabbix_url,
                token: token.into(),
                host_group_id: self.zabbix.host_group_id,
                interface_port: self.zabbix.interface_port,
                trigger_priority: self.zabbix.trigger_priority,
                request_timeout: self.zabbix.request_timeout,
                connect_timeout: self.zabbix.connect_timeout,
            },
            search: SearchSettings {
                url: search_url,
                username: self.elasticsearch.username,
                password: SecretString::from(self.elasticsearch.password),
            },
            health_timeout: self.health.timeout,
        })
    }
}

impl Default for RawServer {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            port: default_server_port(),
        }
    }
}

impl Default for RawZabbix {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            host_group_id: default_host_group_id(),
            interface_port: default_interface_port(),
            trigger_priority: default_trigger_priority(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for RawHealth {
    fn default() -> Self {
        Self {
            timeout: default_health_timeout(),
        }
    }
}

fn non_empty(
    field: &'static str,
    value: Option<String>,
) -> std::result::Result<String, ConfigError> {
    let value = value.ok_or(ConfigError::MissingField { field })?;
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            field,
            message: "value cannot be empty".to_string(),
        });
    }
    Ok(value)
}

fn parse_url(field: &'static str, value: Option<String>) -> std::result::Result<Url, ConfigError> {
    let raw = non_empty(field, value)?;
    let url = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidField {
        field,
        message: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidField {
            field,
            message: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

fn numeric(field: &'static str, value: &str) -> std::result::Result<(), ConfigError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::InvalidField {
            field,
            message: format!("expected a number, got {value:?}"),
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: Duration) -> std::result::Result<(), ConfigError> {
    if value.is_zero() {
        return Err(ConfigError::InvalidField {
            field,
            message: "duration must be greater than zero".to_string(),
        });
    }
    Ok(())
}
