//! HTTP surface: alert routes behind basic auth, plus an open health check.

pub mod auth;
pub mod handlers;
pub mod health;
pub mod response;
pub mod server;

pub use handlers::AppState;
pub use health::HealthProbe;
pub use response::{ApiError, Envelope};
pub use server::{build_router, serve};
