use std::fmt;
use std::str::FromStr;
use url::Url;

/// How the active route is encoded in the browser location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    /// Route lives in the URL fragment (`/app/#/profile/1`), no server routing needed
    #[default]
    Hash,
    /// Route is the URL path below the base path (`/app/profile/1`)
    Web,
}

impl HistoryMode {
    /// Extract the route path from a location.
    ///
    /// `location` may be an absolute URL or a bare path/fragment such as
    /// `#/search?q=x`. The returned path always starts with `/`.
    pub fn location_path(self, base: &str, location: &str) -> String {
        let absolute = Url::parse(location).ok();

        let route = match self {
            HistoryMode::Hash => {
                let fragment = match &absolute {
                    Some(url) => url.fragment().map(str::to_string),
                    None => location.split_once('#').map(|(_, f)| f.to_string()),
                };
                fragment.unwrap_or_default()
            }
            HistoryMode::Web => {
                let path_and_query = match &absolute {
                    Some(url) => match url.query() {
                        Some(query) => format!("{}?{}", url.path(), query),
                        None => url.path().to_string(),
                    },
                    None => location
                        .split_once('#')
                        .map_or(location, |(path, _)| path)
                        .to_string(),
                };
                strip_base(base, &path_and_query).to_string()
            }
        };

        if route.starts_with('/') {
            route
        } else {
            format!("/{}", route)
        }
    }

    /// Render a route path as a link target relative to the base path
    pub fn href(self, base: &str, path: &str) -> String {
        match self {
            HistoryMode::Hash => {
                let base = if base.is_empty() { "/" } else { base };
                format!("{}#{}", base, path)
            }
            HistoryMode::Web => format!("{}{}", base.trim_end_matches('/'), path),
        }
    }
}

fn strip_base<'a>(base: &str, path: &'a str) -> &'a str {
    let prefix = base.trim_end_matches('/');
    if prefix.is_empty() {
        return path;
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => rest,
        _ => path,
    }
}

impl FromStr for HistoryMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hash" => Ok(HistoryMode::Hash),
            "web" => Ok(HistoryMode::Web),
            other => Err(anyhow::anyhow!(
                "unknown history mode '{}', expected 'hash' or 'web'",
                other
            )),
        }
    }
}

impl fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryMode::Hash => f.write_str("hash"),
            HistoryMode::Web => f.write_str("web"),
        }
    }
}
