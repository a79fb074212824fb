//! Service health endpoint
//!
//! One endpoint: every session operation goes through the credential
//! store, so a single store ping is the whole readiness story.

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health report returned by GET /health
#[derive(Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub credential_store: &'static str,
}

/// Report service health; 503 while the credential store is unreachable
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let store_ok = db::ping(&state.db).await.is_ok();

    let report = HealthReport {
        status: if store_ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        credential_store: if store_ok { "reachable" } else { "unreachable" },
    };

    let status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report))
}
