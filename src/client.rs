use reqwest::Response;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::error::ClientError;
use crate::models::ApiRequest;
use crate::storage::{KeyValueStore, LOGGED_IN_USER_TOKEN_KEY};

/// Token value sent under [`MissingTokenPolicy::Placeholder`]
pub const PLACEHOLDER_TOKEN: &str = "undefined";

/// What to send when the store holds no token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingTokenPolicy {
    /// Send no `Authorization` header at all
    #[default]
    Omit,
    /// Send `Authorization: Bearer undefined`
    Placeholder,
}

/// Merge the bearer credential into `headers`.
///
/// Caller headers are kept. With a token, `Authorization` is inserted or
/// overwritten. Without one, `policy` decides; `Omit` leaves the headers
/// exactly as given.
pub fn authorize(
    mut headers: HeaderMap,
    token: Option<&str>,
    policy: MissingTokenPolicy,
) -> Result<HeaderMap, ClientError> {
    let token = match (token, policy) {
        (Some(token), _) => token,
        (None, MissingTokenPolicy::Placeholder) => PLACEHOLDER_TOKEN,
        (None, MissingTokenPolicy::Omit) => return Ok(headers),
    };

    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Concatenate a request path onto a base address.
///
/// Only `scheme://...` and protocol-relative `//host/...` paths are absolute.
/// Everything else, including `users:7`, keeps the base path as a prefix.
pub fn join_base(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    if has_scheme(path) {
        return Url::parse(path);
    }
    if path.starts_with("//") {
        return base.join(path);
    }
    Url::parse(&format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

/// `^[a-zA-Z][a-zA-Z0-9+.-]*://`
fn has_scheme(path: &str) -> bool {
    let Some((scheme, _)) = path.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

/// HTTP client bound to the API base address that attaches the stored
/// bearer token to every request.
///
/// Cheap to clone; clones share the connection pool and the token store.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    store: Arc<dyn KeyValueStore>,
    timeout: Duration,
    missing_token: MissingTokenPolicy,
}

impl ApiClient {
    pub fn new(
        base_url: Url,
        store: Arc<dyn KeyValueStore>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            store,
            timeout,
            missing_token: MissingTokenPolicy::default(),
        })
    }

    pub fn from_config(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ClientError> {
        let client = Self::new(
            config.api_url.clone(),
            store,
            Duration::from_millis(config.request_timeout_ms),
        )?;
        tracing::info!(
            "API client ready for {} (timeout {} ms)",
            client.base_url,
            config.request_timeout_ms
        );
        Ok(client)
    }

    pub fn with_missing_token_policy(mut self, policy: MissingTokenPolicy) -> Self {
        self.missing_token = policy;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn missing_token_policy(&self) -> MissingTokenPolicy {
        self.missing_token
    }

    pub fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        join_base(&self.base_url, path).map_err(|source| ClientError::InvalidUrl {
            url: path.to_string(),
            source,
        })
    }

    /// Send a request with the current token attached.
    ///
    /// The token is read from the store on every call. Any HTTP status is
    /// returned as `Ok`; only transport failures and timeouts are errors.
    /// A single attempt is made.
    pub async fn send(&self, request: ApiRequest) -> Result<Response, ClientError> {
        let ApiRequest {
            method,
            path,
            headers,
            body,
        } = request;

        let url = self.url_for(&path)?;
        let token = self.store.get_item(LOGGED_IN_USER_TOKEN_KEY)?;
        if token.is_none() {
            tracing::debug!(
                "No token under {}, applying {:?} policy",
                LOGGED_IN_USER_TOKEN_KEY,
                self.missing_token
            );
        }
        let headers = authorize(headers, token.as_deref(), self.missing_token)?;

        tracing::debug!("{} {}", method, url);

        let mut builder = self.http.request(method.clone(), url.clone()).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        match builder.send().await {
            Ok(response) => {
                tracing::debug!("{} {} -> {}", method, url, response.status());
                Ok(response)
            }
            Err(source) if source.is_timeout() => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!("{} {} timed out after {} ms", method, url, timeout_ms);
                Err(ClientError::Timeout { timeout_ms, source })
            }
            Err(source) => {
                tracing::warn!("{} {} failed: {}", method, url, source);
                Err(ClientError::Http(source))
            }
        }
    }

    pub async fn get(&self, path: &str) -> Result<Response, ClientError> {
        self.send(ApiRequest::get(path)).await
    }
}
