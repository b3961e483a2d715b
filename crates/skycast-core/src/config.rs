use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Environment variable consulted when `weather.api_key` is not set.
pub const API_KEY_ENV: &str = "SKYCAST_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Location search (autocomplete) settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Geocoding provider settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Start-up location settings
    #[serde(default)]
    pub location: LocationConfig,
}

/// How overlapping lookups are resolved when they complete out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Only the most recently scheduled lookup may update the list.
    #[default]
    LatestRequest,
    /// Whichever lookup completes last updates the list.
    LastCompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet window before a typed query is sent, in milliseconds
    #[serde(default = "default_quiet_window_ms")]
    pub quiet_window_ms: u64,

    /// Maximum number of suggestions requested per lookup
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    #[serde(default)]
    pub completion_policy: CompletionPolicy,
}

fn default_quiet_window_ms() -> u64 {
    1000
}

fn default_result_limit() -> usize {
    2
}

impl SearchConfig {
    pub fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.quiet_window_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            quiet_window_ms: default_quiet_window_ms(),
            result_limit: default_result_limit(),
            completion_policy: CompletionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Nominatim base URL (search and reverse endpoints are appended)
    pub base_url: String,

    /// Nominatim's usage policy requires an identifying User-Agent
    pub user_agent: String,

    pub timeout_secs: u64,
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("SkyCast/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

/// Measurement system requested from the weather provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    /// Value of the provider's `units` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
            Self::Standard => "standard",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
            Self::Standard => "K",
        }
    }

    pub fn wind_suffix(&self) -> &'static str {
        match self {
            Self::Imperial => "mph",
            Self::Metric | Self::Standard => "m/s",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap data API base URL
    pub base_url: String,

    /// OpenWeatherMap API key (falls back to SKYCAST_API_KEY)
    pub api_key: Option<String>,

    pub units: Units,

    /// Number of 3-hour forecast rows shown
    pub forecast_hours: usize,

    pub timeout_secs: u64,
}

fn default_forecast_hours() -> usize {
    8
}

impl WeatherConfig {
    /// Configured API key, or the environment variable if unset.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            api_key: None,
            units: Units::default(),
            forecast_hours: default_forecast_hours(),
            timeout_secs: 10,
        }
    }
}

/// A latitude/longitude pair as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Fixed start-up position; when unset the fallback is used
    pub fixed: Option<Coordinates>,

    /// Position used when no location source is available
    #[serde(default = "default_fallback")]
    pub fallback: Coordinates,
}

fn default_fallback() -> Coordinates {
    // Moscow
    Coordinates {
        latitude: 55.7504461,
        longitude: 37.6174943,
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fixed: None,
            fallback: default_fallback(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating it if missing
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)?;

        let config: Config =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Load configuration from the default path and validate it
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        Self::load_validated_from(&Self::config_path()?)
    }

    /// Load configuration from `path` and validate it
    ///
    /// Warnings are logged; errors fail the load.
    pub fn load_validated_from(path: &Path) -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load_from(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.search.quiet_window_ms == 0 {
            result.add_warning(
                "search.quiet_window_ms",
                "Debounce disabled (0 ms); every keystroke hits the geocoder",
            );
        } else if self.search.quiet_window_ms > 10_000 {
            result.add_warning(
                "search.quiet_window_ms",
                "Quiet window is longer than 10 seconds",
            );
        }

        if self.search.result_limit == 0 {
            result.add_error("search.result_limit", "Result limit must be greater than 0");
        } else if self.search.result_limit > 40 {
            result.add_warning(
                "search.result_limit",
                "Nominatim returns at most 40 results per query",
            );
        }

        validate_url(&self.geocoding.base_url, "geocoding.base_url", &mut result);
        if self.geocoding.user_agent.trim().is_empty() {
            result.add_error("geocoding.user_agent", "User agent must not be empty");
        }
        if self.geocoding.timeout_secs == 0 {
            result.add_error("geocoding.timeout_secs", "Timeout must be greater than 0");
        }

        validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        }
        if self.weather.api_key().is_none() {
            result.add_warning(
                "weather.api_key",
                format!("No API key configured (set it here or in {})", API_KEY_ENV),
            );
        }
        if self.weather.forecast_hours == 0 {
            result.add_warning("weather.forecast_hours", "Hourly forecast hidden (0 rows)");
        } else if self.weather.forecast_hours > 40 {
            result.add_warning(
                "weather.forecast_hours",
                "The forecast endpoint returns at most 40 rows",
            );
        }

        if let Some(fixed) = &self.location.fixed {
            validate_coordinates(fixed, "location.fixed", &mut result);
        }
        validate_coordinates(&self.location.fallback, "location.fallback", &mut result);

        result
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::MissingSetting("user config directory".into()))?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }
            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}

fn validate_coordinates(coords: &Coordinates, field_name: &str, result: &mut ValidationResult) {
    if !(-90.0..=90.0).contains(&coords.latitude) {
        result.add_error(
            format!("{}.latitude", field_name),
            "Latitude must be between -90 and 90",
        );
    }
    if !(-180.0..=180.0).contains(&coords.longitude) {
        result.add_error(
            format!("{}.longitude", field_name),
            "Longitude must be between -180 and 180",
        );
    }
}
