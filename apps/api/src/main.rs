mod analysis;
mod analytics;
mod auth;
mod config;
mod errors;
mod kv;
mod llm_client;
mod notifications;
mod resumes;
mod routes;
mod state;
mod storage;
#[cfg(test)]
mod test_support;
mod views;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::client::ClaudeFeedbackClient;
use crate::analysis::rasterize::PdfiumRasterizer;
use crate::auth::session::KvSessionAuth;
use crate::config::Config;
use crate::kv::redis::RedisKv;
use crate::llm_client::LlmClient;
use crate::notifications::NotificationCenter;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::s3::{build_s3_client, S3BlobStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},analytics=info",
                env!("CARGO_PKG_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeX API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Redis (records + sessions)
    let kv = Arc::new(
        RedisKv::connect(&config.redis_url)
            .await
            .context("Failed to connect to Redis")?,
    );

    // Initialize S3 / MinIO (PDFs + previews)
    let s3 = build_s3_client(&config).await;
    let blobs = Arc::new(S3BlobStore::new(s3, config.s3_bucket.clone()));
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let feedback = Arc::new(ClaudeFeedbackClient::new(llm, blobs.clone()));

    // pdfium is bound per render
    let rasterizer = Arc::new(PdfiumRasterizer::new(
        config.pdfium_library_path.clone(),
        config.preview_max_pixels,
    ));

    let auth = Arc::new(KvSessionAuth::new(
        kv.clone(),
        config.session_ttl_hours,
        config.access_key.clone(),
    ));
    if config.access_key.is_none() {
        info!("ACCESS_KEY not set; sign-in accepts any valid username");
    }

    let state = AppState {
        kv,
        blobs,
        auth,
        feedback,
        rasterizer,
        notifications: NotificationCenter::new(Duration::from_millis(config.toast_duration_ms)),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
