//! Plain-text rendering of service results.

use skye_core::{CitySearchResult, TrackedLocation, WeatherSnapshot};
use std::io::{self, Write};

pub fn print_progress(fraction: f64, message: &str) {
    let pct = (fraction.clamp(0.0, 1.0) * 100.0).round();
    let mut err = io::stderr();
    let _ = write!(err, "\r[{pct:>3}%] {message:<40}");
    if fraction >= 1.0 {
        let _ = writeln!(err);
    }
    let _ = err.flush();
}

pub fn print_snapshot(snapshot: &WeatherSnapshot) {
    let c = &snapshot.current;
    let loc = &snapshot.location;

    println!("{}, {}  (updated {})", loc.city, loc.country, snapshot.last_updated);
    println!();
    println!("  {}°C  {}  [{}]", c.temp, c.description, c.icon);
    println!(
        "  Feels like {}°C   Humidity {}%   Wind {} m/s",
        c.feels_like, c.humidity, c.wind_speed
    );
    println!(
        "  Visibility {} km   Precipitation {}%   UV {:.1}",
        c.visibility, c.precipitation, c.uv_index
    );
    println!("  Sunrise {}   Sunset {}", c.sunrise, c.sunset);
    println!("  Air quality {} ({})", c.aqi, c.aqi_status);

    if !snapshot.hourly.is_empty() {
        println!();
        println!("Next 24 hours");
        for slice in &snapshot.hourly {
            println!("  {:>8}  {:>4}°C  {}", slice.hour, slice.temp, slice.icon);
        }
    }

    if !snapshot.daily.is_empty() {
        println!();
        println!("Next days");
        for slice in &snapshot.daily {
            println!("  {:>4}  {:>4}°C  {}", slice.day, slice.temp, slice.icon);
        }
    }
}

pub fn print_search_results(results: &[CitySearchResult]) {
    if results.is_empty() {
        println!("No cities found.");
        return;
    }
    for city in results {
        println!("{city}");
    }
}

pub fn print_locations(locations: &[TrackedLocation]) {
    if locations.is_empty() {
        println!("No tracked cities. Add one with `skye track <city>`.");
        return;
    }
    for loc in locations {
        println!("{}, {} ({})", loc.name, loc.country, loc.coordinate);
    }
}
