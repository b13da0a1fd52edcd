use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use skye_core::{
    Config, Coordinate, FileStore, FixedGeolocator, LocationService, SystemClock, TrackedLocation,
    WeatherCache, WeatherError, WeatherService, provider_from_config,
};
use std::sync::Arc;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skye", version, about = "Weather forecasts in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and an optional home location.
    Configure,

    /// Show current conditions and the forecast.
    Show {
        /// Latitude in degrees (requires --lon).
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude in degrees (requires --lat).
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Name of a tracked city.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        /// Skip the cache and fetch fresh data.
        #[arg(long)]
        refresh: bool,
    },

    /// Search for cities by name.
    Search {
        query: String,

        /// Maximum number of results (capped at 50).
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Search for a city and add it to the tracked list.
    Track { query: String },

    /// Stop tracking a city.
    Untrack { name: String },

    /// List tracked cities.
    Locations,

    /// Show the place name for the home location.
    Where,

    /// Delete the cached weather snapshot.
    ClearCache,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                lat,
                lon,
                city,
                refresh,
            } => {
                let config = Config::load()?;
                let coordinate = resolve_coordinate(&config, lat.zip(lon), city.as_deref()).await?;
                show(&config, coordinate, refresh).await
            }
            Command::Search { query, limit } => {
                let service = build_service(&Config::load()?)?;
                let results = service.search_cities(&query, limit).await.map_err(user_error)?;
                output::print_search_results(&results);
                Ok(())
            }
            Command::Track { query } => track(&query).await,
            Command::Untrack { name } => {
                let mut config = Config::load()?;
                if !config.untrack_location(&name) {
                    bail!("'{name}' is not a tracked city");
                }
                config.save()?;
                println!("Stopped tracking {name}.");
                Ok(())
            }
            Command::Locations => {
                output::print_locations(&Config::load()?.locations);
                Ok(())
            }
            Command::Where => {
                let config = Config::load()?;
                let coordinate = device_coordinate(&config).await?;
                let info = build_service(&config)?.reverse_geocode(coordinate).await;
                println!("{}, {} ({})", info.city, info.country, info.coordinate);
                Ok(())
            }
            Command::ClearCache => {
                build_cache()?.clear();
                println!("Weather cache cleared.");
                Ok(())
            }
        }
    }
}

fn build_cache() -> Result<WeatherCache> {
    let store = FileStore::new()?;
    Ok(WeatherCache::new(Arc::new(store), Arc::new(SystemClock)))
}

fn build_service(config: &Config) -> Result<WeatherService> {
    let provider = provider_from_config(config)?;
    Ok(WeatherService::new(
        Arc::from(provider),
        build_cache()?,
        Arc::new(SystemClock),
    ))
}

/// Map a service error to its short user-facing message.
fn user_error(err: WeatherError) -> anyhow::Error {
    tracing::debug!("{err}");
    let hint = if err.is_retryable() { " Run the command again to retry." } else { "" };
    anyhow!("{}{hint}", err.user_message())
}

async fn device_coordinate(config: &Config) -> Result<Coordinate> {
    let geolocator = FixedGeolocator::new(config.home_coordinate());
    LocationService::new(Arc::new(geolocator))
        .current_coordinate()
        .await
        .map_err(|e| {
            anyhow!(
                "{}\nHint: set a home location with `skye configure`, or pass --lat/--lon.",
                e.user_message()
            )
        })
}

async fn resolve_coordinate(
    config: &Config,
    explicit: Option<(f64, f64)>,
    city: Option<&str>,
) -> Result<Coordinate> {
    if let Some((latitude, longitude)) = explicit {
        return Coordinate::new(latitude, longitude).map_err(user_error);
    }

    if let Some(name) = city {
        let tracked = config.find_location(name).ok_or_else(|| {
            anyhow!("'{name}' is not a tracked city. Use `skye track {name}` first.")
        })?;
        return Ok(tracked.coordinate);
    }

    device_coordinate(config).await
}

async fn show(config: &Config, coordinate: Coordinate, refresh: bool) -> Result<()> {
    let service = build_service(config)?;
    let on_progress = |fraction: f64, message: &str| output::print_progress(fraction, message);

    let snapshot = if refresh {
        service.fetch_weather_data(coordinate, Some(&on_progress)).await
    } else {
        service.load_weather(coordinate, Some(&on_progress)).await
    }
    .map_err(user_error)?;

    output::print_snapshot(&snapshot);
    Ok(())
}

async fn track(query: &str) -> Result<()> {
    let mut config = Config::load()?;
    let service = build_service(&config)?;

    let results = service.search_cities(query, 10).await.map_err(user_error)?;
    if results.is_empty() {
        bail!("No cities found for '{query}'");
    }

    let choice = if results.len() == 1 {
        results.into_iter().next().context("search result vanished")?
    } else {
        Select::new("Which city?", results).prompt()?
    };

    let name = choice.name.clone();
    let added = config.track_location(TrackedLocation {
        name: choice.name,
        country: choice.country,
        coordinate: choice.coordinate,
    });
    config.save()?;

    if added {
        println!("Now tracking {name}.");
    } else {
        println!("Updated tracked city {name}.");
    }
    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    if api_key.trim().is_empty() {
        bail!("API key cannot be empty");
    }
    config.set_api_key(api_key.trim().to_string());

    let home = Text::new("Home location as 'lat, lon' (leave empty to skip):").prompt()?;
    if !home.trim().is_empty() {
        config.home = Some(parse_lat_lon(&home)?);
    }

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn parse_lat_lon(input: &str) -> Result<Coordinate> {
    let (lat, lon) = input
        .split_once(',')
        .ok_or_else(|| anyhow!("Expected 'lat, lon', got '{input}'"))?;
    let latitude: f64 = lat.trim().parse().context("Latitude is not a number")?;
    let longitude: f64 = lon.trim().parse().context("Longitude is not a number")?;
    Coordinate::new(latitude, longitude).map_err(user_error)
}
