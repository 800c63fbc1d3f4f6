//! Weather lookup CLI - current conditions and forecast for a city
//!
//! Prints a plain-text report for the requested location, or for the caller's
//! IP location when none is given. Lookups are cached on disk for a few
//! minutes.

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use weather_lookup::cache::{CacheStore, FileStore, KeyValueStore, MemoryStore};
use weather_lookup::cli::{Cli, Lookup};
use weather_lookup::{FetchError, WeatherFetcher, WeatherResult};

/// Logs go to stderr so stdout carries only the report
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Picks the cache substrate: explicit directory, platform cache dir, or memory
fn open_store(cli: &Cli) -> Arc<dyn KeyValueStore> {
    if let Some(dir) = &cli.cache_dir {
        return Arc::new(FileStore::with_dir(dir.clone()));
    }
    match FileStore::new() {
        Some(store) => Arc::new(store),
        None => {
            tracing::warn!("no cache directory available, caching in memory only");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Writes the report for one lookup to stdout
fn print_report(result: &WeatherResult) {
    let location = &result.location;
    let current = &result.current;

    println!("{}, {}", location.name, location.country);
    println!("Updated: {}", current.last_updated);
    println!(
        "{:.0}°C  {}  (feels like {:.0}°C)",
        current.temp_c.round(),
        current.condition.text,
        current.feelslike_c.round()
    );
    println!(
        "Humidity {}%  Wind {} km/h  Visibility {} km  Pressure {} mb  UV {}",
        current.humidity, current.wind_kph, current.vis_km, current.pressure_mb, current.uv
    );

    if !result.days().is_empty() {
        println!();
    }
    for forecast_day in result.days() {
        let day = &forecast_day.day;
        println!(
            "{}  {:>3.0}° / {:<3.0}°  {}  💧{}%  🌬️{:.0}km/h",
            forecast_day.date.format("%a %m-%d"),
            day.maxtemp_c.round(),
            day.mintemp_c.round(),
            day.condition.text,
            day.avghumidity,
            day.maxwind_kph.round()
        );
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let cache = CacheStore::new(open_store(&cli), cli.cache_config());

    if cli.clear_cache {
        let removed = cache.clear();
        println!("Removed {} cached lookup(s)", removed);
        return Ok(());
    }

    cache.sweep_expired();

    let lookup = cli.lookup()?;
    let fetcher = WeatherFetcher::new(cli.fetcher_config(), cache)?;

    match fetcher.fetch_weather(lookup.query()).await {
        Ok(result) => print_report(&result),
        // Auto-locate is a convenience; only a missing key is worth reporting
        Err(e) if lookup == Lookup::AutoLocate && e != FetchError::ConfigurationMissing => {
            tracing::info!(error = %e, "auto-locate failed");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
