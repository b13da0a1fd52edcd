use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::model::{Coordinate, DEFAULT_PROXIMITY_M};
use crate::provider::openweather::{DEFAULT_DATA_URL, DEFAULT_GEO_URL, DEFAULT_TIMEOUT_SECS};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "SKYE_API_KEY";

const MAX_TIMEOUT_SECS: u64 = 60;

/// Upstream base URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    pub data_url: String,
    pub geo_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            geo_url: DEFAULT_GEO_URL.to_string(),
        }
    }
}

/// A city the user follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedLocation {
    pub name: String,
    pub country: String,
    pub coordinate: Coordinate,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// request_timeout_secs = 15
///
/// [home]
/// latitude = 37.7749
/// longitude = -122.4194
///
/// [[locations]]
/// name = "Paris"
/// country = "FR"
/// coordinate = { latitude = 48.8566, longitude = 2.3522 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,

    pub request_timeout_secs: Option<u64>,

    /// Position used when no device location is available.
    pub home: Option<Coordinate>,

    pub endpoints: Endpoints,

    pub locations: Vec<TrackedLocation>,
}

impl Config {
    /// API key, or an error with a hint to configure one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `skye configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, MAX_TIMEOUT_SECS)
    }

    /// Home coordinate, if one is configured and valid.
    pub fn home_coordinate(&self) -> Option<Coordinate> {
        self.home.filter(Coordinate::is_valid)
    }

    pub fn find_location(&self, name: &str) -> Option<&TrackedLocation> {
        self.locations
            .iter()
            .find(|loc| loc.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Add a city, replacing any tracked entry within proximity tolerance.
    /// Returns `true` when a new entry was added.
    pub fn track_location(&mut self, location: TrackedLocation) -> bool {
        let existing = self
            .locations
            .iter_mut()
            .find(|loc| loc.coordinate.is_near(&location.coordinate, DEFAULT_PROXIMITY_M));

        match existing {
            Some(slot) => {
                *slot = location;
                false
            }
            None => {
                self.locations.push(location);
                true
            }
        }
    }

    /// Remove a tracked city by name. Returns whether one was removed.
    pub fn untrack_location(&mut self, name: &str) -> bool {
        let before = self.locations.len();
        self.locations
            .retain(|loc| !loc.name.eq_ignore_ascii_case(name.trim()));
        self.locations.len() != before
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    /// `SKYE_API_KEY` takes precedence over the stored key.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;

        if let Ok(key) = env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                cfg.api_key = Some(key);
            }
        }

        Ok(cfg)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skye", "skye")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
