//! Client-side core of the photo web UI: the route table that maps locations
//! to views, and the HTTP client that carries the stored bearer token.

pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod navigator;
pub mod router;
pub mod routes;
pub mod state;
pub mod storage;

pub use client::{ApiClient, MissingTokenPolicy, authorize};
pub use config::Config;
pub use error::{ClientError, RouteError, StorageError};
pub use history::HistoryMode;
pub use models::ApiRequest;
pub use navigator::Navigator;
pub use router::{RouteEntry, RouteMatch, RouteTable, View};
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, LOGGED_IN_USER_TOKEN_KEY, MemoryStore};
