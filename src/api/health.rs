use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::Result;
use crate::error::ZbxError;

/// Reachability check of the monitoring and search systems.
///
/// Any HTTP answer counts as reachable; only connection-level failures and
/// timeouts make the probe fail.
#[derive(Clone)]
pub struct HealthProbe {
    http: reqwest::Client,
    targets: Vec<(&'static str, Url)>,
}

impl HealthProbe {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(zabbix: Url, search: Url, timeout: Duration, insecure_tls: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure_tls)
            .user_agent(concat!("logalert/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ZbxError::Client { source: err })?;
        Ok(Self {
            http,
            targets: vec![("zabbix", zabbix), ("elasticsearch", search)],
        })
    }

    /// Probe every target in order and report the first unreachable one.
    ///
    /// # Errors
    ///
    /// Returns a message naming the target and the transport error.
    pub async fn check(&self) -> std::result::Result<(), String> {
        for (name, url) in &self.targets {
            if let Err(err) = self.http.get(url.clone()).send().await {
                warn!(system = *name, url = %url, error = %err, "health probe failed");
                return Err(format!("{name} unreachable: {err}"));
            }
        }
        Ok(())
    }
}
