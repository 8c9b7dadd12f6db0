use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub s3_endpoint: String,
    pub s3_access_key_id: String,
    pub s3_secret_access_key: String,
    pub s3_bucket_name: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP byte-serving gateway for video objects")]
pub struct Args {
    /// Host to bind to (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Object-store endpoint URL (overrides S3_ENDPOINT)
    #[arg(long)]
    pub s3_endpoint: Option<String>,

    /// Access key id (overrides S3_ACCESS_KEY_ID)
    #[arg(long)]
    pub s3_access_key_id: Option<String>,

    /// Secret access key (overrides S3_SECRET_ACCESS_KEY)
    #[arg(long)]
    pub s3_secret_access_key: Option<String>,

    /// Bucket holding the video objects (overrides S3_BUCKET_NAME)
    #[arg(long)]
    pub s3_bucket_name: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading PORT"),
        };

        // --- Merge ---
        let s3_endpoint = args
            .s3_endpoint
            .or_else(|| env::var("S3_ENDPOINT").ok())
            .context("S3_ENDPOINT is required (env var or --s3-endpoint)")?;
        let s3_access_key_id = args
            .s3_access_key_id
            .or_else(|| env::var("S3_ACCESS_KEY_ID").ok())
            .unwrap_or_default();
        let s3_secret_access_key = args
            .s3_secret_access_key
            .or_else(|| env::var("S3_SECRET_ACCESS_KEY").ok())
            .unwrap_or_default();
        let s3_bucket_name = args
            .s3_bucket_name
            .or_else(|| env::var("S3_BUCKET_NAME").ok())
            .context("S3_BUCKET_NAME is required (env var or --s3-bucket-name)")?;

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            s3_endpoint,
            s3_access_key_id,
            s3_secret_access_key,
            s3_bucket_name,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
