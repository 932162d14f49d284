use std::fmt::Write as FmtWrite;
use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::error::{Error, ZbxError};

use super::rpc::{REQUEST_ID, RpcEnvelope, RpcRequest, body_preview};

const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct ZbxClient {
    http: reqwest::Client,
    base: Url,
    token: SecretString,
}

impl ZbxClient {
    /// Build a `ZbxClient` configured with the supplied parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTPS is required but the URL uses HTTP, or if the
    /// underlying HTTP client fails to build.
    pub fn new(
        base: Url,
        token: SecretString,
        timeout: Duration,
        connect_timeout: Duration,
        insecure_http: bool,
    ) -> Result<Self> {
        if base.scheme() != "https" && !insecure_http {
            return Err(Error::Config(crate::error::ConfigError::InvalidField {
                field: "zabbix.url",
                message: "only https URLs are accepted without --insecure".to_string(),
            }));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json-rpc"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .user_agent(concat!("logalert/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30));

        if !insecure_http {
            builder = builder.https_only(true);
        }

        let http = builder
            .build()
            .map_err(|err| ZbxError::Client { source: err })?;

        Ok(Self { http, base, token })
    }

    /// Issue one JSON-RPC call and decode its `result`.
    ///
    /// Transport failures and non-2xx statuses are reported as transport
    /// errors. An envelope whose `error.message` is non-empty becomes
    /// [`ZbxError::Api`]. Calls are never retried.
    pub(super) async fn call<P, T>(&self, method: &str, params: &P) -> Result<T>
    where
        P: Serialize + Sync,
        T: DeserializeOwned,
    {
        let correlation_id = Uuid::now_v7().to_string();
        let started = Instant::now();
        let payload = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: REQUEST_ID,
            auth: self.token.expose_secret(),
        };

        let response = self
            .http
            .post(self.base.clone())
            .header(CORRELATION_HEADER, &correlation_id)
            .json(&payload)
            .send()
            .await
            .map_err(ZbxError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ZbxError::HttpStatus { status }.into());
        }

        let body = response.bytes().await.map_err(ZbxError::from)?;

        let envelope: RpcEnvelope<T> = serde_json::from_slice(&body).map_err(|err| {
            let mut message = format!("error decoding response body: {err}; body preview: ");
            let _ = FmtWrite::write_str(&mut message, &body_preview(&body));
            ZbxError::Json { message }
        })?;

        if let Some(err) = envelope.error {
            if !err.message.is_empty() {
                let mut message = err.message;
                if let Some(data) = err.data.filter(|data| !data.is_empty()) {
                    let _ = FmtWrite::write_fmt(&mut message, format_args!(" - {data}"));
                }
                debug!(method, %correlation_id, code = err.code, "zabbix call rejected");
                return Err(ZbxError::Api {
                    code: err.code,
                    message,
                }
                .into());
            }
        }

        let result = envelope
            .result
            .ok_or(ZbxError::MissingField { field: "result" })?;
        debug!(
            method,
            %correlation_id,
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "zabbix call succeeded"
        );
        Ok(result)
    }
}
