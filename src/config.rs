use std::env;
use std::path::PathBuf;
use anyhow::{Context, Result, ensure};
use url::Url;

use crate::history::HistoryMode;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub static_files_url: Url,
    pub app_base_path: String,
    pub history_mode: HistoryMode,
    pub token_store_path: PathBuf,
    pub request_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_url = parse_url("API_URL")?;
        let static_files_url = parse_url("STATIC_FILES_URL")?;

        let app_base_path = env::var("APP_BASE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| "/".to_string());
        ensure!(
            app_base_path.starts_with('/'),
            "APP_BASE_PATH must start with '/', got '{}'",
            app_base_path
        );

        let history_mode = match env::var("HISTORY_MODE") {
            Ok(mode) => mode
                .parse::<HistoryMode>()
                .context("HISTORY_MODE must be 'hash' or 'web'")?,
            Err(_) => HistoryMode::Hash,
        };

        let token_store_path = env::var("TOKEN_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".webui/storage.json"));

        let request_timeout_ms = env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .context("REQUEST_TIMEOUT_MS must be a whole number of milliseconds")?;
        ensure!(request_timeout_ms > 0, "REQUEST_TIMEOUT_MS must be greater than zero");

        Ok(Config {
            api_url,
            static_files_url,
            app_base_path,
            history_mode,
            token_store_path,
            request_timeout_ms,
        })
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  API base URL: {}", self.api_url);
        tracing::info!("  Static files URL: {}", self.static_files_url);
        tracing::info!("  App base path: {}", self.app_base_path);
        tracing::info!("  History mode: {}", self.history_mode);
        tracing::info!("  Token store: {}", self.token_store_path.display());
        tracing::info!("  Request timeout: {} ms", self.request_timeout_ms);
    }
}

fn parse_url(key: &str) -> Result<Url> {
    let raw = env::var(key).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    Url::parse(&raw).with_context(|| format!("{} must be an absolute URL, got '{}'", key, raw))
}
