//! WeatherAPI.com forecast client
//!
//! `WeatherFetcher` answers "weather for this location" from the cache when it
//! can and from one `forecast.json` request when it cannot. Every failure is
//! classified into a `FetchError`.

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::instrument;

use super::WeatherResult;
use crate::cache::{normalize_query, CacheStore};
use crate::config::FetcherConfig;

/// Why a weather lookup failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No usable API key is configured
    #[error("API key is not configured; set WEATHERAPI_KEY (free key at https://www.weatherapi.com/signup.aspx)")]
    ConfigurationMissing,

    /// The provider did not recognize the location (HTTP 400)
    #[error("Location not found, check the city name and try again")]
    InvalidQuery,

    /// The provider rejected the API key (HTTP 401)
    #[error("API key was rejected, check the configuration")]
    Unauthorized,

    /// No response was received at all
    #[error("Network connection failed, check your connection")]
    NetworkUnavailable,

    /// Any other non-success HTTP status
    #[error("Request failed with status {status}")]
    UpstreamError { status: u16 },

    /// A success response whose body is not a forecast
    #[error("Weather service returned an unreadable response")]
    MalformedResponse,
}

impl FetchError {
    /// Classifies a non-success HTTP status
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::InvalidQuery,
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            other => Self::UpstreamError {
                status: other.as_u16(),
            },
        }
    }
}

/// Cache-backed weather lookup
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    http_client: Client,
    cache: CacheStore,
    config: FetcherConfig,
}

impl WeatherFetcher {
    /// Creates a fetcher with an HTTP client built from `config`
    pub fn new(config: FetcherConfig, cache: CacheStore) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(http_client, config, cache))
    }

    /// Creates a fetcher around an existing HTTP client
    pub fn with_client(http_client: Client, config: FetcherConfig, cache: CacheStore) -> Self {
        Self {
            http_client,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Returns weather for `query`
    ///
    /// # Behavior
    /// - Fails with `ConfigurationMissing` before touching the cache or the
    ///   network when no API key is set
    /// - Returns a fresh cached result without revalidating it
    /// - Otherwise sends exactly one request; no retries
    /// - Caches a successful result before returning it (best-effort)
    ///
    /// Concurrent calls for the same query are not coalesced; each miss sends
    /// its own request.
    #[instrument(skip(self))]
    pub async fn fetch_weather(&self, query: &str) -> Result<WeatherResult, FetchError> {
        let api_key = self
            .config
            .credential()
            .ok_or(FetchError::ConfigurationMissing)?;

        let cache_query = self.cache_query(query);
        if let Some(cached) = self.cache.get(&cache_query) {
            return Ok(cached);
        }

        let result = self.fetch_from_api(api_key, query).await?;
        self.cache.put(&cache_query, &result);
        Ok(result)
    }

    /// Query the cache is consulted with
    ///
    /// The location alone for default requests; otherwise the normalized
    /// location plus the language and horizon, so `lang=en&days=3` and
    /// `lang=zh&days=7` lookups of the same city are cached separately.
    pub fn cache_query(&self, query: &str) -> String {
        match self.config.cache_variant() {
            None => query.to_string(),
            Some(variant) => format!("{}#{}", normalize_query(query), variant),
        }
    }

    /// Sends one forecast request and classifies the outcome
    async fn fetch_from_api(&self, api_key: &str, query: &str) -> Result<WeatherResult, FetchError> {
        let q = normalize_query(query);
        let days = self.config.days.to_string();
        tracing::info!(query = %q, "requesting forecast");

        let response = self
            .http_client
            .get(self.config.forecast_url())
            .query(&[
                ("key", api_key),
                ("q", q.as_str()),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("lang", self.config.lang.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "forecast request failed");
                FetchError::NetworkUnavailable
            })?;

        let status = response.status();
        if !status.is_success() {
            let error = FetchError::from_status(status);
            tracing::warn!(status = status.as_u16(), %error, "forecast request rejected");
            return Err(error);
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, "forecast body could not be read");
            FetchError::NetworkUnavailable
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(error = %e, "forecast body is not a valid forecast");
            FetchError::MalformedResponse
        })
    }
}
