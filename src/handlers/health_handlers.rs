//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks backend reachability

use crate::services::object_store::{ObjectStoreError, SharedObjectStore};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that HEADs a sentinel key at the backend. A clean answer
/// or a definite "not found" both prove the backend is reachable; only an
/// upstream fault marks the gateway unready.
///
/// Returns JSON describing the check. HTTP 200 when it passes,
/// HTTP 503 when it fails.
pub async fn readyz(State(store): State<SharedObjectStore>) -> impl IntoResponse {
    let backend_check = match store.head_object(".readyz-probe").await {
        Ok(_) | Err(ObjectStoreError::NotFound { .. }) => (true, None::<String>),
        Err(err) => (false, Some(format!("error: {}", err))),
    };

    let backend_ok = backend_check.0;

    let mut checks = HashMap::new();
    checks.insert(
        "backend",
        CheckStatus {
            ok: backend_ok,
            error: backend_check.1,
        },
    );

    let body = ReadyResponse {
        status: if backend_ok { "ok".into() } else { "error".into() },
        checks,
    };

    let status = if backend_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
