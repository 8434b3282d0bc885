use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// How callers are identified from their bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// No identity backend configured: every caller is anonymous.
    Anonymous,
    /// Development only: the bearer token itself is taken as the uid.
    TrustedBearer,
}

/// Where collections live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// One JSON file per collection under `data_dir`.
    File,
    /// Process memory; everything is lost on restart.
    Memory,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub store_backend: StoreBackend,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub auth_mode: AuthMode,
    pub max_upload_bytes: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: optional_env("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            data_dir: optional_env("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            store_backend: parse_store_backend(optional_env("STORE_BACKEND").as_deref())?,
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| "gemini-2.0-flash".to_string()),
            auth_mode: parse_auth_mode(optional_env("AUTH_MODE").as_deref())?,
            max_upload_bytes: optional_env("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|| (5 * 1024 * 1024).to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Unset and blank variables are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_auth_mode(value: Option<&str>) -> Result<AuthMode> {
    match value.map(str::trim) {
        None | Some("anonymous") => Ok(AuthMode::Anonymous),
        Some("trusted-bearer") => Ok(AuthMode::TrustedBearer),
        Some(other) => bail!("AUTH_MODE must be 'anonymous' or 'trusted-bearer', got '{other}'"),
    }
}

fn parse_store_backend(value: Option<&str>) -> Result<StoreBackend> {
    match value.map(str::trim) {
        None | Some("file") => Ok(StoreBackend::File),
        Some("memory") => Ok(StoreBackend::Memory),
        Some(other) => bail!("STORE_BACKEND must be 'file' or 'memory', got '{other}'"),
    }
}
