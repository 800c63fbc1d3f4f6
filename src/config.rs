//! Runtime configuration for the cache and the weather fetcher

use std::time::Duration;

/// Default WeatherAPI.com endpoint root
pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Key prefix for every cache entry this crate owns
pub const DEFAULT_NAMESPACE: &str = "weather_cache_";

/// How long a cached response stays fresh
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Credential value that means "not configured yet"
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// Number of forecast days requested from the provider
pub const DEFAULT_FORECAST_DAYS: u8 = 7;

/// Language for condition text
pub const DEFAULT_LANG: &str = "zh";

/// HTTP request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for `CacheStore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Prefix prepended to every normalized query to form a key
    pub namespace: String,
    /// Maximum age at which an entry is still served
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            ttl: DEFAULT_TTL,
        }
    }
}

/// Settings for `WeatherFetcher`
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// WeatherAPI.com key
    pub api_key: Option<String>,
    /// Endpoint root, without trailing `/forecast.json`
    pub base_url: String,
    /// Forecast horizon in days
    pub days: u8,
    /// Language for condition text
    pub lang: String,
    /// Request timeout applied by the HTTP client
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            days: DEFAULT_FORECAST_DAYS,
            lang: DEFAULT_LANG.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FetcherConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns the API key if one is really configured
    ///
    /// Blank keys and the placeholder sentinel count as missing.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
    }

    /// Request parameters that change the response body, if not the defaults
    ///
    /// Folded into the cache key so lookups made with a different language or
    /// horizon never share an entry. `None` for the default request keeps the
    /// plain `weather_cache_<query>` key.
    pub fn cache_variant(&self) -> Option<String> {
        if self.lang == DEFAULT_LANG && self.days == DEFAULT_FORECAST_DAYS {
            None
        } else {
            Some(format!("lang={}&days={}", self.lang, self.days))
        }
    }

    /// Full URL of the forecast endpoint
    pub fn forecast_url(&self) -> String {
        format!("{}/forecast.json", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.namespace, "weather_cache_");
        assert_eq!(config.ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_fetcher_config_default() {
        let config = FetcherConfig::default();
        assert_eq!(config.base_url, "https://api.weatherapi.com/v1");
        assert_eq!(config.days, 7);
        assert_eq!(config.lang, "zh");
        assert!(config.credential().is_none());
    }

    #[test]
    fn test_credential_rejects_placeholder_and_blank() {
        let placeholder = FetcherConfig::default().with_api_key(PLACEHOLDER_API_KEY);
        assert!(placeholder.credential().is_none());

        let blank = FetcherConfig::default().with_api_key("   ");
        assert!(blank.credential().is_none());

        let real = FetcherConfig::default().with_api_key(" abc123 ");
        assert_eq!(real.credential(), Some("abc123"));
    }

    #[test]
    fn test_cache_variant_only_for_non_default_requests() {
        assert!(FetcherConfig::default().cache_variant().is_none());

        let english = FetcherConfig {
            lang: "en".to_string(),
            ..FetcherConfig::default()
        };
        assert_eq!(english.cache_variant().as_deref(), Some("lang=en&days=7"));

        let short = FetcherConfig {
            days: 3,
            ..FetcherConfig::default()
        };
        assert_eq!(short.cache_variant().as_deref(), Some("lang=zh&days=3"));
    }

    #[test]
    fn test_forecast_url_trims_trailing_slash() {
        let config = FetcherConfig::default().with_base_url("http://127.0.0.1:8080/v1/");
        assert_eq!(config.forecast_url(), "http://127.0.0.1:8080/v1/forecast.json");
    }
}
