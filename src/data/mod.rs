//! Weather data model
//!
//! These types mirror the JSON returned by WeatherAPI.com's `forecast.json`
//! endpoint, so a response body deserializes straight into a `WeatherResult`
//! and a cached entry serializes back into the same shape.

pub mod weather;

pub use weather::{FetchError, WeatherFetcher};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Full result of a forecast lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    /// Resolved location
    pub location: Location,
    /// Conditions right now
    pub current: CurrentConditions,
    /// Daily forecast
    pub forecast: Forecast,
}

impl WeatherResult {
    /// Forecast days in the order the provider returned them
    pub fn days(&self) -> &[ForecastDay] {
        &self.forecast.forecastday
    }
}

/// Location the provider matched the query to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub region: String,
    pub country: String,
}

/// Condition description and icon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Localized description, e.g. "晴" or "Sunny"
    pub text: String,
    /// Protocol-relative icon URL (`//cdn.weatherapi.com/...`)
    pub icon: String,
    #[serde(default)]
    pub code: u32,
}

impl Condition {
    /// Icon URL with an explicit scheme
    pub fn icon_url(&self) -> String {
        if self.icon.starts_with("//") {
            format!("https:{}", self.icon)
        } else {
            self.icon.clone()
        }
    }
}

/// Current conditions block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Provider timestamp of the observation, local time ("2024-07-15 14:00")
    pub last_updated: String,
    /// Temperature in Celsius
    pub temp_c: f64,
    /// Feels-like temperature in Celsius
    pub feelslike_c: f64,
    pub condition: Condition,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Wind speed in km/h
    pub wind_kph: f64,
    /// Visibility in km
    pub vis_km: f64,
    /// Pressure in millibars
    pub pressure_mb: f64,
    /// UV index
    pub uv: f64,
}

/// Wrapper matching the provider's `forecast` object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

/// One forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: DaySummary,
}

/// Aggregates for a forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    /// Maximum temperature in Celsius
    pub maxtemp_c: f64,
    /// Minimum temperature in Celsius
    pub mintemp_c: f64,
    /// Average relative humidity percentage
    pub avghumidity: f64,
    /// Maximum wind speed in km/h
    pub maxwind_kph: f64,
    pub condition: Condition,
}
