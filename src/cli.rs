//! Command-line interface parsing for the weather lookup tool
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the cache and fetcher configuration plus the location to look up.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::config::{
    CacheConfig, FetcherConfig, DEFAULT_BASE_URL, DEFAULT_FORECAST_DAYS, DEFAULT_LANG,
    DEFAULT_NAMESPACE, DEFAULT_TIMEOUT, DEFAULT_TTL,
};

/// Query that asks the provider to geolocate the caller by IP address
pub const AUTO_LOCATE_QUERY: &str = "auto:ip";

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// A location was given but contains only whitespace
    #[error("Please enter a city name")]
    BlankLocation,
}

/// Look up current weather and a multi-day forecast
#[derive(Parser, Debug)]
#[command(name = "weather")]
#[command(about = "Current weather and forecast from WeatherAPI.com, cached for a few minutes")]
#[command(version)]
pub struct Cli {
    /// City or place to look up; omit to locate by IP address
    ///
    /// Examples:
    ///   weather                # Auto-locate
    ///   weather London
    ///   weather New York
    #[arg(value_name = "LOCATION")]
    pub location: Vec<String>,

    /// WeatherAPI.com API key
    #[arg(long, env = "WEATHERAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API root URL
    #[arg(long, env = "WEATHERAPI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Language for condition text
    #[arg(long, default_value = DEFAULT_LANG)]
    pub lang: String,

    /// Number of forecast days to request
    #[arg(long, default_value_t = DEFAULT_FORECAST_DAYS, value_parser = clap::value_parser!(u8).range(1..=14))]
    pub days: u8,

    /// How long a cached lookup stays fresh, in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TTL.as_secs())]
    pub ttl_secs: u64,

    /// HTTP request timeout, in seconds
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Directory for the cache file (defaults to the platform cache directory)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Remove all cached lookups and exit
    #[arg(long)]
    pub clear_cache: bool,
}

/// What the user asked to look up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// An explicit location query
    Location(String),
    /// No location given; locate by IP address
    AutoLocate,
}

impl Lookup {
    pub fn query(&self) -> &str {
        match self {
            Lookup::Location(query) => query.as_str(),
            Lookup::AutoLocate => AUTO_LOCATE_QUERY,
        }
    }
}

impl Cli {
    /// Resolves the positional arguments into a lookup
    ///
    /// # Returns
    /// * `Ok(Lookup::AutoLocate)` when no location was given
    /// * `Ok(Lookup::Location)` with the words joined by single spaces
    /// * `Err(CliError::BlankLocation)` if the location is only whitespace
    pub fn lookup(&self) -> Result<Lookup, CliError> {
        if self.location.is_empty() {
            return Ok(Lookup::AutoLocate);
        }

        let query = self
            .location
            .iter()
            .map(|word| word.trim())
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if query.is_empty() {
            Err(CliError::BlankLocation)
        } else {
            Ok(Lookup::Location(query))
        }
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            days: self.days,
            lang: self.lang.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            namespace: DEFAULT_NAMESPACE.to_string(),
            ttl: Duration::from_secs(self.ttl_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args_auto_locates() {
        let cli = Cli::parse_from(["weather"]);
        assert_eq!(cli.lookup().unwrap(), Lookup::AutoLocate);
        assert_eq!(cli.lookup().unwrap().query(), "auto:ip");
    }

    #[test]
    fn test_cli_parse_single_word_location() {
        let cli = Cli::parse_from(["weather", "London"]);
        assert_eq!(cli.lookup().unwrap(), Lookup::Location("London".to_string()));
    }

    #[test]
    fn test_cli_parse_multi_word_location() {
        let cli = Cli::parse_from(["weather", "New", " York "]);
        assert_eq!(cli.lookup().unwrap().query(), "New York");
    }

    #[test]
    fn test_cli_blank_location_is_rejected() {
        let cli = Cli::parse_from(["weather", "   "]);
        let err = cli.lookup().unwrap_err();
        assert!(err.to_string().contains("city name"));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["weather", "--api-key", "k", "Paris"]);

        let fetcher = cli.fetcher_config();
        assert_eq!(fetcher.credential(), Some("k"));
        assert_eq!(fetcher.days, 7);
        assert_eq!(fetcher.lang, "zh");
        assert_eq!(fetcher.timeout, Duration::from_secs(10));

        let cache = cli.cache_config();
        assert_eq!(cache, CacheConfig::default());
        assert!(!cli.clear_cache);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "weather",
            "--base-url",
            "http://localhost:9000/v1",
            "--lang",
            "en",
            "--days",
            "3",
            "--ttl-secs",
            "60",
            "--cache-dir",
            "/tmp/wx",
            "Paris",
        ]);

        assert_eq!(cli.fetcher_config().base_url, "http://localhost:9000/v1");
        assert_eq!(cli.fetcher_config().lang, "en");
        assert_eq!(cli.fetcher_config().days, 3);
        assert_eq!(cli.cache_config().ttl, Duration::from_secs(60));
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/wx")));
    }

    #[test]
    fn test_cli_days_out_of_range() {
        assert!(Cli::try_parse_from(["weather", "--days", "0"]).is_err());
        assert!(Cli::try_parse_from(["weather", "--days", "15"]).is_err());
    }

    #[test]
    fn test_cli_zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["weather", "--timeout-secs", "0"]).is_err());

        let cli = Cli::try_parse_from(["weather", "--timeout-secs", "1"]).unwrap();
        assert_eq!(cli.fetcher_config().timeout, Duration::from_secs(1));
    }
}
