//! Weather Lookup Library
//!
//! Cache-backed access to WeatherAPI.com forecasts. `WeatherFetcher` is the
//! single entry point; `CacheStore` keeps successful lookups for a short TTL.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;

pub use cache::CacheStore;
pub use data::{FetchError, WeatherFetcher, WeatherResult};
