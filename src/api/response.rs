use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::error::{AlertError, Error};

const SUCCESS: &str = "success";
const FAILURE: &str = "failure";

/// `{"status": ..., "error": ..., "data": ...}`, the shape of every reply.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub error: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub const fn success(data: T) -> Self {
        Self {
            status: SUCCESS,
            error: String::new(),
            data,
        }
    }
}

impl Envelope<Map<String, Value>> {
    #[must_use]
    pub fn failure(error: String) -> Self {
        Self {
            status: FAILURE,
            error,
            data: Map::new(),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Unauthorized,
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if !err.is_client_error() {
            error!(error = %err, "request failed");
        }
        match err {
            Error::Alert(AlertError::Validation { .. }) => Self::Validation(err.to_string()),
            Error::Alert(AlertError::NotFound { .. }) => Self::NotFound(err.to_string()),
            Error::Alert(AlertError::Conflict { .. }) => Self::Conflict(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Unauthorized => "authentication required".to_string(),
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Internal(msg) => msg,
        };
        if status.is_client_error() {
            warn!(status = status.as_u16(), error = %message, "request rejected");
        }

        let mut response = (status, Json(Envelope::failure(message))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"logalert\""),
            );
        }
        response
    }
}
