//! HTTP client and the validated fetch shared by every endpoint

use std::time::Duration;

use npq_core::error::{NpqError, NpqResult};
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{Cache, Headers, RequestIdentity};
use crate::validate::{self, Shape};

mod endpoints;

pub use endpoints::MAX_BULK_PACKAGES;

/// Base URL of the npm registry API
pub const NPM_REGISTRY_API_URL: &str = "https://registry.npmjs.org";

/// Base URL of the npm downloads API
pub const NPM_REGISTRY_DOWNLOADS_API_URL: &str = "https://api.npmjs.org";

/// Options for building a [`RegistryClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Registry metadata/package API base URL
    pub registry_api_url: String,
    /// Downloads API base URL
    pub downloads_api_url: String,
    /// Response cache; `None` disables caching
    pub cache: Option<Cache>,
    /// Whole-request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            registry_api_url: NPM_REGISTRY_API_URL.to_string(),
            downloads_api_url: NPM_REGISTRY_DOWNLOADS_API_URL.to_string(),
            cache: None,
            timeout: Duration::from_secs(30),
            user_agent: concat!("npq/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Typed client for the npm registry and downloads APIs.
///
/// Cloning is cheap; clones share the connection pool and the cache.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    http: Client,
    registry_api_url: Url,
    downloads_api_url: Url,
    cache: Option<Cache>,
}

impl RegistryClient {
    /// Client for the public npm registry, without a cache
    pub fn new() -> NpqResult<Self> {
        Self::with_options(ClientOptions::default())
    }

    /// Client for the public npm registry using `cache`
    pub fn with_cache(cache: Cache) -> NpqResult<Self> {
        Self::with_options(ClientOptions {
            cache: Some(cache),
            ..ClientOptions::default()
        })
    }

    /// Create registry client with custom configuration
    pub fn with_options(options: ClientOptions) -> NpqResult<Self> {
        let registry_api_url = parse_base_url("registry_api_url", &options.registry_api_url)?;
        let downloads_api_url = parse_base_url("downloads_api_url", &options.downloads_api_url)?;

        let http = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(options.timeout)
            .gzip(true)
            .user_agent(options.user_agent)
            .build()
            .map_err(|e| NpqError::network("Failed to create HTTP client".to_string(), e))?;

        Ok(Self {
            http,
            registry_api_url,
            downloads_api_url,
            cache: options.cache,
        })
    }

    pub fn registry_api_url(&self) -> &Url {
        &self.registry_api_url
    }

    pub fn downloads_api_url(&self) -> &Url {
        &self.downloads_api_url
    }

    pub fn cache(&self) -> Option<&Cache> {
        self.cache.as_ref()
    }

    /// Fetch `url` and validate the response against shape `T`.
    ///
    /// With a cache, a stored value for the same URL and headers is returned
    /// instead of fetching, after being validated against `T` again. A stored
    /// value that no longer fits `T` is a validation error, not a miss.
    /// Responses are stored only after they pass validation.
    pub async fn fetch<T: Shape>(&self, url: &Url, headers: Option<&Headers>) -> NpqResult<T> {
        let Some(cache) = &self.cache else {
            let response = self.get_json(url, headers).await?;
            return validate::validate(response);
        };

        let key = cache.key_for(&RequestIdentity::new(url.as_str(), headers));
        if let Some(cached) = cache.storage().get(&key).await? {
            debug!(url = %url, key = %key, shape = T::NAME, "cache hit");
            return validate::validate(cached);
        }

        debug!(url = %url, key = %key, shape = T::NAME, "cache miss");
        let response = self.get_json(url, headers).await?;
        let data: T = validate::validate(response)?;
        cache.storage().set(&key, validate::to_stored(&data)?).await?;
        debug!(key = %key, driver = cache.storage().name(), "cache store");
        Ok(data)
    }

    /// GET `url` and decode the body as JSON
    async fn get_json(&self, url: &Url, headers: Option<&Headers>) -> NpqResult<Value> {
        let mut request = self.http.get(url.clone());
        for (name, value) in headers.into_iter().flatten() {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!(url = %url, "GET");
        let response = request
            .send()
            .await
            .map_err(|e| NpqError::network(format!("Failed to fetch {url}"), e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Registry returned an error status");
            return Err(NpqError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| NpqError::network(format!("Failed to read JSON response from {url}"), e))
    }
}

/// Parse a base URL and make sure relative endpoint paths append to it
fn parse_base_url(field: &str, raw: &str) -> NpqResult<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| NpqError::invalid_argument(field, format!("'{raw}' is not a valid URL: {e}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(NpqError::invalid_argument(
            field,
            format!("'{raw}' is not an http(s) base URL"),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Append path segments to a base URL, percent-encoding each segment
fn endpoint_url(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[cfg(test)]
mod tests;
