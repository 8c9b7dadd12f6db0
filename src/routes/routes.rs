//! Defines routes for the video byte-serving gateway.
//!
//! ## Structure
//! - **Video endpoints**
//!   - `GET  /video/{filename}` — stream an object, honoring `Range`
//!   - `HEAD /video/{filename}` — size and range-support headers only
//!
//! - **Health endpoints**
//!   - `GET /healthz` — liveness
//!   - `GET /readyz`  — readiness (backend reachability)
//!
//! `filename` is an opaque object key; it is handed to the backend as-is and
//! never interpreted as a filesystem path.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        video_handlers::{get_video, head_video},
    },
    services::object_store::SharedObjectStore,
};
use axum::{Router, routing::get};

/// Build and return the router for all gateway routes.
///
/// The router carries the shared backend handle (`SharedObjectStore`) to all
/// handlers; it is the only state that outlives a single request.
pub fn routes() -> Router<SharedObjectStore> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // video byte-serving
        .route("/video/{filename}", get(get_video).head(head_video))
}
