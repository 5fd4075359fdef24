use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::RouteError;
use crate::routes;

/// Characters left unescaped when a parameter is rendered into a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Views a route can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum View {
    Login,
    Stream,
    Profile,
    Search,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Login => "LoginView",
            View::Stream => "StreamView",
            View::Profile => "ProfileView",
            View::Search => "SearchView",
        };
        f.write_str(name)
    }
}

/// A single entry of the route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub pattern: String,
    pub name: Option<String>,
    pub view: View,
}

impl RouteEntry {
    pub fn new(pattern: impl Into<String>, view: View) -> Self {
        Self {
            pattern: pattern.into(),
            name: None,
            view,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    entry: RouteEntry,
    segments: Vec<Segment>,
}

impl CompiledRoute {
    fn compile(entry: RouteEntry) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: entry.pattern.clone(),
            reason: reason.to_string(),
        };

        let rest = entry
            .pattern
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;

        let segments = parse_segments(rest).map_err(|reason| invalid(&reason))?;

        Ok(Self { entry, segments })
    }

    fn matches(&self, parts: &[&str]) -> Option<BTreeMap<String, String>> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(expected) => {
                    if !expected.eq_ignore_ascii_case(part) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    let value = percent_decode_str(part).decode_utf8_lossy().into_owned();
                    params.insert(name.clone(), value);
                }
            }
        }
        Some(params)
    }
}

fn parse_segments(rest: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    if rest.is_empty() {
        return Ok(segments);
    }

    let mut seen = HashSet::new();
    for raw in rest.split('/') {
        if raw.is_empty() {
            return Err("empty path segment".to_string());
        }
        match raw.strip_prefix(':') {
            Some("") => return Err("empty parameter name".to_string()),
            Some(param) => {
                if !seen.insert(param) {
                    return Err(format!("parameter '{}' appears twice", param));
                }
                segments.push(Segment::Param(param.to_string()));
            }
            None => segments.push(Segment::Static(raw.to_string())),
        }
    }
    Ok(segments)
}

/// Result of resolving a path against the route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub entry: RouteEntry,
    /// Normalized path that was matched, without query or fragment
    pub path: String,
    pub params: BTreeMap<String, String>,
    /// Query parameters; a repeated key keeps every value in order
    pub query: BTreeMap<String, Vec<String>>,
}

impl RouteMatch {
    pub fn view(&self) -> View {
        self.entry.view
    }

    pub fn name(&self) -> Option<&str> {
        self.entry.name.as_deref()
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// First value of a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key)?.first().map(String::as_str)
    }
}

/// Static mapping from path pattern to view, built once at startup
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Build a table from entries in declaration order.
    ///
    /// Fails on malformed patterns and on duplicate patterns.
    pub fn new(entries: impl IntoIterator<Item = RouteEntry>) -> Result<Self, RouteError> {
        let mut routes: Vec<CompiledRoute> = Vec::new();
        for entry in entries {
            if routes.iter().any(|r| r.entry.pattern == entry.pattern) {
                return Err(RouteError::DuplicatePattern(entry.pattern));
            }
            routes.push(CompiledRoute::compile(entry)?);
        }
        Ok(Self { routes })
    }

    /// The application's route table
    pub fn app() -> Result<Self, RouteError> {
        Self::new([
            RouteEntry::new(routes::LOGIN, View::Login).named(routes::LOGIN_NAME),
            RouteEntry::new(routes::STREAM, View::Stream),
            RouteEntry::new(routes::PROFILE, View::Profile).named(routes::PROFILE_NAME),
            RouteEntry::new(routes::SEARCH, View::Search).named(routes::SEARCH_NAME),
        ])
    }

    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter().map(|r| &r.entry)
    }

    /// Resolve a path (optionally carrying `?query` and `#fragment`) to the
    /// first matching entry.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let without_fragment = path.split_once('#').map_or(path, |(p, _)| p);
        let (raw_path, raw_query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));

        let normalized = normalize_path(raw_path);
        let parts: Vec<&str> = match normalized.strip_prefix('/') {
            Some("") | None => Vec::new(),
            Some(rest) => rest.split('/').collect(),
        };

        if parts.iter().any(|part| part.is_empty()) {
            tracing::debug!("No route matches {} (empty segment)", normalized);
            return None;
        }

        let matched = self
            .routes
            .iter()
            .find_map(|route| route.matches(&parts).map(|params| (route, params)));

        match matched {
            Some((route, params)) => {
                let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()).into_owned() {
                    query.entry(key).or_default().push(value);
                }
                tracing::debug!(
                    "Resolved {} to {} (pattern {})",
                    normalized,
                    route.entry.view,
                    route.entry.pattern
                );
                Some(RouteMatch {
                    entry: route.entry.clone(),
                    path: normalized,
                    params,
                    query,
                })
            }
            None => {
                tracing::debug!("No route matches {}", normalized);
                None
            }
        }
    }

    /// Build the concrete path for a named route
    pub fn resolve_named(
        &self,
        name: &str,
        params: &[(&str, &str)],
    ) -> Result<String, RouteError> {
        let route = self
            .routes
            .iter()
            .find(|r| r.entry.name.as_deref() == Some(name))
            .ok_or_else(|| RouteError::UnknownName(name.to_string()))?;

        if route.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut path = String::new();
        for segment in &route.segments {
            path.push('/');
            match segment {
                Segment::Static(s) => path.push_str(s),
                Segment::Param(param) => {
                    let value = params
                        .iter()
                        .find(|(key, _)| key == param)
                        .map(|(_, value)| *value)
                        .filter(|value| !value.is_empty())
                        .ok_or_else(|| RouteError::MissingParam {
                            name: name.to_string(),
                            param: param.clone(),
                        })?;
                    path.extend(utf8_percent_encode(value, SEGMENT));
                }
            }
        }
        Ok(path)
    }
}

/// Ensure a leading slash and drop one trailing slash after a non-empty segment
fn normalize_path(path: &str) -> String {
    let mut normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    if normalized.len() > 1 && normalized.ends_with('/') && !normalized.ends_with("//") {
        normalized.pop();
    }
    normalized
}
