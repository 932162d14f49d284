use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::info;

use crate::Result;
use crate::alert::{AlertService, AlertView, CreatedAlert, DeletedAlert, LogicalAlert};
use crate::config::{BasicAuth, Config};
use crate::zbx_client::ZbxClient;

use super::health::HealthProbe;
use super::response::{ApiError, Envelope};

/// Shared by every handler; read-only after startup.
pub struct AppState {
    pub alerts: AlertService,
    pub health: HealthProbe,
    pub auth: BasicAuth,
}

impl AppState {
    /// Wire the Zabbix client, alert service and health probe from `config`.
    ///
    /// `insecure` allows a plain-HTTP Zabbix URL and skips TLS verification
    /// in the health probe.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built or the Zabbix URL
    /// is rejected.
    pub fn from_config(config: &Config, insecure: bool) -> Result<Self> {
        let client = ZbxClient::new(
            config.zabbix.url.clone(),
            config.zabbix.token.clone(),
            config.zabbix.request_timeout,
            config.zabbix.connect_timeout,
            insecure,
        )?;
        let alerts = AlertService::new(client, config.search.backend(), config.zabbix.defaults());
        let health = HealthProbe::new(
            config.zabbix.url.clone(),
            config.search.url.clone(),
            config.health_timeout,
            insecure,
        )?;
        Ok(Self {
            alerts,
            health,
            auth: config.basic_auth.clone(),
        })
    }
}

// ============================================================================
// Health Check
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    match state.health.check().await {
        Ok(()) => Json(Envelope::success(serde_json::Map::new())).into_response(),
        Err(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Envelope::failure(message)),
        )
            .into_response(),
    }
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateAlertQuery {
    pub name: String,
    pub index: String,
    pub query_string: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAlertBody {
    pub delay: String,
    pub threshold: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn create_alert(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<CreateAlertQuery>, QueryRejection>,
    body: std::result::Result<Json<CreateAlertBody>, JsonRejection>,
) -> std::result::Result<Json<Envelope<CreatedAlert>>, ApiError> {
    let Query(query) = query.map_err(|err| ApiError::Validation(err.body_text()))?;
    let Json(body) = body.map_err(|err| ApiError::Validation(err.body_text()))?;

    let alert = LogicalAlert {
        name: query.name,
        index: query.index,
        query_string: query.query_string,
        delay: body.delay,
        threshold: body.threshold,
        description: body.description.unwrap_or_default(),
    };
    info!(alert = %alert.name, index = %alert.index, "creating alert");
    let created = state.alerts.create(&alert).await?;
    Ok(Json(Envelope::success(created)))
}

#[derive(Debug, Deserialize)]
pub struct DeleteAlertQuery {
    pub name: String,
    #[serde(default)]
    pub index: Option<String>,
}

pub async fn delete_alert(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<DeleteAlertQuery>, QueryRejection>,
) -> std::result::Result<Json<Envelope<DeletedAlert>>, ApiError> {
    let Query(query) = query.map_err(|err| ApiError::Validation(err.body_text()))?;
    let Some(name) = non_blank(Some(&query.name)) else {
        return Err(ApiError::Validation("invalid name: value is required".to_string()));
    };
    let deleted = state
        .alerts
        .delete(name, non_blank(query.index.as_deref()))
        .await?;
    Ok(Json(Envelope::success(deleted)))
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryAlertsQuery {
    #[serde(default)]
    pub index: Option<String>,
}

pub async fn query_alerts(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<QueryAlertsQuery>, QueryRejection>,
) -> std::result::Result<Json<Envelope<Vec<AlertView>>>, ApiError> {
    let Query(query) = query.map_err(|err| ApiError::Validation(err.body_text()))?;
    let alerts = state
        .alerts
        .query(non_blank(query.index.as_deref()))
        .await?;
    Ok(Json(Envelope::success(alerts)))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
