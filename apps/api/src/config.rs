use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Largest résumé accepted by the upload form.
    pub max_upload_bytes: usize,
    pub session_ttl_hours: i64,
    pub toast_duration_ms: u64,
    /// When set, sign-in requires this shared key.
    pub access_key: Option<String>,
    /// Directory holding the pdfium shared library. System search path when unset.
    pub pdfium_library_path: Option<String>,
    pub preview_max_pixels: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            s3_region: optional_env("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            session_ttl_hours: parse_env("SESSION_TTL_HOURS", 24)
                .context("SESSION_TTL_HOURS must be a whole number of hours")?,
            toast_duration_ms: parse_env("TOAST_DURATION_MS", 5000)
                .context("TOAST_DURATION_MS must be a number of milliseconds")?,
            access_key: optional_env("ACCESS_KEY"),
            pdfium_library_path: optional_env("PDFIUM_LIBRARY_PATH"),
            preview_max_pixels: parse_env("PREVIEW_MAX_PIXELS", 1600)
                .context("PREVIEW_MAX_PIXELS must be a pixel count")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => Ok(raw.trim().parse::<T>()?),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Settings used by handler tests; no real backends are contacted.
    pub fn for_tests() -> Self {
        Config {
            redis_url: "redis://localhost:6379".to_string(),
            s3_bucket: "resumex-test".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_region: "us-east-1".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            anthropic_api_key: "test".to_string(),
            port: 8080,
            rust_log: "debug".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_ttl_hours: 24,
            toast_duration_ms: 5000,
            access_key: None,
            pdfium_library_path: None,
            preview_max_pixels: 1600,
        }
    }
}
