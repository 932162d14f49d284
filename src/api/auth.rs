use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::BasicAuth;

use super::handlers::AppState;
use super::response::ApiError;

/// Reject requests whose `Authorization: Basic` header does not match the
/// configured operator credentials.
pub async fn require_basic_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic);

    match presented {
        Some((username, password)) if matches(&state.auth, &username, &password) => {
            next.run(req).await
        }
        Some((username, _)) => {
            debug!(%username, "basic auth rejected");
            ApiError::Unauthorized.into_response()
        }
        None => ApiError::Unauthorized.into_response(),
    }
}

/// Decode `Basic <base64(user:password)>`.
pub(crate) fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Both fields are always compared, in constant time for equal lengths.
fn matches(expected: &BasicAuth, username: &str, password: &str) -> bool {
    let user = expected.username.as_bytes().ct_eq(username.as_bytes());
    let pass = expected
        .password
        .expose_secret()
        .as_bytes()
        .ct_eq(password.as_bytes());
    (user & pass).into()
}
