//! Logical alerts and the workflows that map them onto Zabbix objects.

mod decoder;
mod encoder;
mod host;
mod service;

use serde::Serialize;

use crate::error::AlertError;

pub use decoder::decode;
pub use encoder::{EncodedAlert, encode};
pub use host::{HostRef, HostResolver, host_name_for};
pub use service::{AlertService, CreatedAlert, DeletedAlert, SearchBackend, ZabbixDefaults};

const DELAY_UNITS: &[char] = &['s', 'm', 'h', 'd', 'w'];

/// An operator's alert rule as received over HTTP. Never stored locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalAlert {
    pub name: String,
    pub index: String,
    pub query_string: String,
    pub delay: String,
    pub threshold: String,
    pub description: String,
}

impl LogicalAlert {
    /// Copy with surrounding whitespace removed from every field that ends
    /// up inside a Zabbix string.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            index: self.index.trim().to_string(),
            query_string: self.query_string.trim().to_string(),
            delay: self.delay.trim().to_string(),
            threshold: self.threshold.trim().to_string(),
            description: self.description.clone(),
        }
    }

    /// Check the fields that end up inside Zabbix strings.
    ///
    /// Values are checked exactly as they will be encoded, so callers holding
    /// raw input should validate [`LogicalAlert::normalized`]. The threshold
    /// is only required to be present; Zabbix validates the resulting
    /// expression.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), AlertError> {
        required("name", &self.name)?;
        required("index", &self.index)?;
        required("query_string", &self.query_string)?;
        required("threshold", &self.threshold)?;
        if self.index.contains('/') || self.index.trim() != self.index {
            return Err(invalid(
                "index",
                "index pattern cannot contain '/' or surrounding whitespace",
            ));
        }
        if host_name_for(&self.index).is_empty() {
            return Err(invalid("index", "index pattern needs a non-wildcard character"));
        }
        validate_delay(&self.delay)
    }
}

/// An alert rebuilt from a Zabbix item and its trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertView {
    pub name: String,
    pub key: String,
    pub item_id: String,
    pub trigger_id: Option<String>,
    pub host_id: String,
    pub host_name: String,
    #[serde(rename = "elasticsearch")]
    pub search_endpoint: String,
    pub index: String,
    pub query_string: String,
    pub delay: String,
    pub threshold: String,
    pub description: String,
}

fn required(field: &'static str, value: &str) -> Result<(), AlertError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "value is required"));
    }
    Ok(())
}

fn invalid(field: &'static str, message: &str) -> AlertError {
    AlertError::Validation {
        field,
        message: message.to_string(),
    }
}

/// `<digits><unit>`, a form both Zabbix intervals and search date math accept.
fn validate_delay(delay: &str) -> Result<(), AlertError> {
    let valid = delay
        .strip_suffix(DELAY_UNITS)
        .is_some_and(|amount| {
            !amount.is_empty()
                && amount.bytes().all(|b| b.is_ascii_digit())
                && amount.bytes().any(|b| b != b'0')
        });
    if valid {
        Ok(())
    } else {
        Err(AlertError::Validation {
            field: "delay",
            message: format!("expected a positive duration such as 30s, 3m or 1h, got {delay:?}"),
        })
    }
}
