use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Zabbix(#[from] ZbxError),
    #[error(transparent)]
    Alert(#[from] AlertError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("HTTP server failed")]
    Server {
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("missing required configuration field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ZbxError {
    #[error("failed to build HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: reqwest::StatusCode },
    #[error("invalid JSON payload: {message}")]
    Json { message: String },
    #[error("invalid field {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("Zabbix API error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("missing field in API response: {field}")]
    MissingField { field: &'static str },
}

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("{what} not found: {name}")]
    NotFound { what: &'static str, name: String },
    #[error("alert already exists: {name}")]
    Conflict { name: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unable to parse query document: {message}")]
    InvalidDocument { message: String },
    #[error("query_string clause not found in query document")]
    MissingQueryClause,
    #[error("no index segment in search URL {url}")]
    MissingIndexSegment { url: String },
    #[error("unable to parse search URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("no threshold in trigger expression {expression}")]
    MissingThreshold { expression: String },
}

impl From<reqwest::Error> for ZbxError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_status() {
            if let Some(status) = source.status() {
                return Self::HttpStatus { status };
            }
        }
        Self::Request { source }
    }
}

impl Error {
    /// True when the failure comes from the caller's input rather than from a
    /// remote system or the local setup.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Alert(AlertError::Validation { .. } | AlertError::NotFound { .. })
                | Self::Alert(AlertError::Conflict { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{AlertError, Error, ZbxError};

    #[test]
    fn client_errors_are_alert_failures_only() {
        let not_found = Error::from(AlertError::NotFound {
            what: "alert",
            name: "err-5xx".to_string(),
        });
        assert!(not_found.is_client_error());
        assert_eq!(not_found.to_string(), "alert not found: err-5xx");

        let api = Error::from(ZbxError::Api {
            code: -32602,
            message: "Invalid params.".to_string(),
        });
        assert!(!api.is_client_error());
    }
}
