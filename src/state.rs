use anyhow::{Context, Result};
use std::sync::Arc;
use url::Url;

use crate::client::{ApiClient, join_base};
use crate::config::Config;
use crate::navigator::Navigator;
use crate::router::RouteTable;
use crate::storage::{FileStore, KeyValueStore};

/// Shared application state, built once and handed to each view
#[derive(Clone)]
pub struct AppState {
    pub client: ApiClient,
    pub routes: Arc<RouteTable>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.token_store_path));
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let client =
            ApiClient::from_config(&config, store).context("Failed to create API client")?;
        let routes = RouteTable::app().context("Failed to build route table")?;

        Ok(Self {
            client,
            routes: Arc::new(routes),
            config: Arc::new(config),
        })
    }

    pub fn navigator(&self) -> Navigator {
        Navigator::from_config(self.routes.clone(), &self.config)
    }

    /// URL of a static asset, e.g. a photo file
    pub fn asset_url(&self, path: &str) -> Result<Url> {
        join_base(&self.config.static_files_url, path)
            .with_context(|| format!("Invalid asset path '{}'", path))
    }
}
