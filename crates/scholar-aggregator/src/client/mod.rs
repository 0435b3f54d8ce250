//! Shared HTTP client for every upstream catalog and inference endpoint.
//!
//! Provides:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff
//! - Per-host rate limiting via governor
//! - Response caching keyed by request fingerprint

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use moka::future::Cache;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::Value;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};

/// HTTP client shared by source adapters and collaborators.
#[derive(Clone)]
pub struct HttpClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Response cache.
    cache: Cache<String, Value>,

    /// Per-host limiter; `None` disables rate limiting.
    limiter: Option<Arc<DefaultKeyedRateLimiter<String>>>,
}

impl HttpClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            concat!("scholar-aggregator/", env!("CARGO_PKG_VERSION")).parse()?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(500), Duration::from_secs(10))
            .build_with_max_retries(2);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        let limiter = NonZeroU32::new(config.requests_per_second)
            .map(|rps| Arc::new(RateLimiter::keyed(Quota::per_second(rps))));

        Ok(Self { client, cache, limiter })
    }

    /// GET a JSON document.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status or undecodable body.
    pub async fn get_json<T>(&self, url: &str, params: &[(String, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let cache_key = self.cache_key("GET", url, params);
        if let Some(cached) = self.cache.get(&cache_key).await {
            return serde_json::from_value(cached).map_err(ClientError::from);
        }

        let response = self.send_get(url, params).await?;
        let value: Value = response.json().await?;

        self.cache.insert(cache_key, value.clone()).await;

        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// GET a text document (used for the arXiv Atom feed).
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or non-success status.
    pub async fn get_text(&self, url: &str, params: &[(String, String)]) -> ClientResult<String> {
        let cache_key = self.cache_key("GET-TEXT", url, params);
        if let Some(Value::String(cached)) = self.cache.get(&cache_key).await {
            return Ok(cached);
        }

        let response = self.send_get(url, params).await?;
        let text = response.text().await?;

        self.cache.insert(cache_key, Value::String(text.clone())).await;

        Ok(text)
    }

    /// POST a JSON body and decode a JSON response. Not cached.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status or undecodable body.
    pub async fn post_json<T>(
        &self,
        url: &str,
        body: &Value,
        bearer_token: Option<&str>,
    ) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.throttle(url).await;

        let body_str = serde_json::to_string(body)?;

        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body_str);

        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let response = self.handle_response(response).await?;
        let value: Value = response.json().await?;

        serde_json::from_value(value).map_err(ClientError::from)
    }

    async fn send_get(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> ClientResult<reqwest::Response> {
        self.throttle(url).await;

        tracing::debug!(url = %url, "GET");
        let response = self.client.get(url).query(params).send().await?;

        self.handle_response(response).await
    }

    /// Wait for the per-host rate limiter.
    async fn throttle(&self, url: &str) {
        if let Some(limiter) = &self.limiter {
            let host = url::Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default();
            limiter.until_key_ready(&host).await;
        }
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }

    /// Generate cache key.
    fn cache_key(&self, method: &str, url: &str, params: &[(String, String)]) -> String {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(method.as_bytes());
        hasher.update(b"|");
        hasher.update(url.as_bytes());
        hasher.update(b"|");

        for (k, v) in params {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"&");
        }

        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").field("rate_limited", &self.limiter.is_some()).finish()
    }
}
