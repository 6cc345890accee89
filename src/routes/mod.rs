//! Route modules for the OCR engine server

pub mod health;
pub mod process;

use axum::Router;

use crate::state::AppState;

/// Assemble the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(process::router())
}
