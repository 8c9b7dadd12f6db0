use anyhow::Result;
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod range;
mod routes;
mod services;

use services::object_store::{HttpObjectStore, SharedObjectStore};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!(
        "Starting video-gateway on {} (bucket `{}` at {})",
        cfg.addr(),
        cfg.s3_bucket_name,
        cfg.s3_endpoint
    );

    // --- Build the long-lived backend handle, shared by every request ---
    let store: SharedObjectStore = Arc::new(HttpObjectStore::new(
        &cfg.s3_endpoint,
        cfg.s3_bucket_name.clone(),
        cfg.s3_access_key_id.clone(),
        cfg.s3_secret_access_key.clone(),
    )?);

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(store);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
