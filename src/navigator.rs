use std::sync::Arc;

use crate::config::Config;
use crate::error::RouteError;
use crate::history::HistoryMode;
use crate::router::{RouteMatch, RouteTable};

/// Tracks the active route and swaps it in place on navigation
#[derive(Debug, Clone)]
pub struct Navigator {
    table: Arc<RouteTable>,
    history: HistoryMode,
    base: String,
    current: Option<RouteMatch>,
}

impl Navigator {
    pub fn new(table: Arc<RouteTable>, history: HistoryMode, base: impl Into<String>) -> Self {
        Self {
            table,
            history,
            base: base.into(),
            current: None,
        }
    }

    pub fn from_config(table: Arc<RouteTable>, config: &Config) -> Self {
        Self::new(table, config.history_mode, config.app_base_path.clone())
    }

    /// Resolve `location` and make it the active route.
    ///
    /// On `NotFound` the active route is left as it was.
    pub fn navigate(&mut self, location: &str) -> Result<&RouteMatch, RouteError> {
        let path = self.history.location_path(&self.base, location);
        let matched = self
            .table
            .resolve(&path)
            .ok_or_else(|| RouteError::NotFound(path.clone()))?;

        tracing::debug!("Navigated to {} ({})", matched.path, matched.view());
        Ok(&*self.current.insert(matched))
    }

    pub fn push_named(
        &mut self,
        name: &str,
        params: &[(&str, &str)],
    ) -> Result<&RouteMatch, RouteError> {
        let path = self.table.resolve_named(name, params)?;
        let href = self.history.href(&self.base, &path);
        self.navigate(&href)
    }

    pub fn current(&self) -> Option<&RouteMatch> {
        self.current.as_ref()
    }

    /// Link target of the active route
    pub fn current_href(&self) -> Option<String> {
        self.current
            .as_ref()
            .map(|m| self.history.href(&self.base, &m.path))
    }

    pub fn history(&self) -> HistoryMode {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::View;
    use crate::state::AppState;
    use crate::storage::{KeyValueStore, LOGGED_IN_USER_TOKEN_KEY, MemoryStore};
    use url::Url;

    fn hash_navigator() -> Navigator {
        Navigator::new(Arc::new(RouteTable::app().unwrap()), HistoryMode::Hash, "/")
    }

    #[test]
    fn test_starts_without_active_route() {
        let navigator = hash_navigator();
        assert!(navigator.current().is_none());
        assert!(navigator.current_href().is_none());
    }

    #[test]
    fn test_navigate_swaps_active_view() {
        let mut navigator = hash_navigator();

        assert_eq!(navigator.navigate("#/login").unwrap().view(), View::Login);
        assert_eq!(navigator.current().unwrap().view(), View::Login);

        let matched = navigator.navigate("http://localhost:5173/#/profile/12").unwrap();
        assert_eq!(matched.view(), View::Profile);
        assert_eq!(matched.param("id"), Some("12"));
        assert_eq!(navigator.current().unwrap().view(), View::Profile);
        assert_eq!(navigator.current_href().as_deref(), Some("/#/profile/12"));
    }

    #[test]
    fn test_empty_hash_is_stream() {
        let mut navigator = hash_navigator();
        assert_eq!(navigator.navigate("http://localhost:5173/").unwrap().view(), View::Stream);
    }

    #[test]
    fn test_unmatched_location_keeps_current() {
        let mut navigator = hash_navigator();
        navigator.navigate("#/search").unwrap();

        let err = navigator.navigate("#/settings").unwrap_err();
        assert_eq!(err, RouteError::NotFound("/settings".to_string()));
        assert_eq!(navigator.current().unwrap().view(), View::Search);
    }

    #[test]
    fn test_push_named_in_web_mode() {
        let mut navigator = Navigator::new(
            Arc::new(RouteTable::app().unwrap()),
            HistoryMode::Web,
            "/photos/",
        );

        let matched = navigator.push_named("Profile", &[("id", "9")]).unwrap();
        assert_eq!(matched.view(), View::Profile);
        assert_eq!(matched.param("id"), Some("9"));
        assert_eq!(navigator.current_href().as_deref(), Some("/photos/profile/9"));

        assert_eq!(
            navigator.navigate("https://example.com/photos/search").unwrap().view(),
            View::Search
        );
    }

    #[test]
    fn test_navigation_leaves_token_untouched() {
        let store = Arc::new(MemoryStore::with_item(LOGGED_IN_USER_TOKEN_KEY, "tok"));
        let config = Config {
            api_url: Url::parse("http://localhost:3000").unwrap(),
            static_files_url: Url::parse("http://localhost:3000").unwrap(),
            app_base_path: "/".to_string(),
            history_mode: HistoryMode::Hash,
            token_store_path: "storage.json".into(),
            request_timeout_ms: 5000,
        };
        let state = AppState::with_store(config, store.clone()).unwrap();
        let mut navigator = state.navigator();

        for location in ["#/login", "#/", "#/profile/3", "#/search", "#/missing"] {
            let _ = navigator.navigate(location);
            assert_eq!(
                store.get_item(LOGGED_IN_USER_TOKEN_KEY).unwrap().as_deref(),
                Some("tok")
            );
        }
    }
}
