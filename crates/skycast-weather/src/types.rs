use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skycast_core::{AppError, Coordinates, NetworkError, ReqwestErrorExt};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by the injected service traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<Coordinates> for Position {
    fn from(c: Coordinates) -> Self {
        Self::new(c.latitude, c.longitude)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// One candidate location returned by a forward search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionItem {
    /// Human-readable "place, region, country"
    pub label: String,
    pub position: Position,
}

/// Weather condition categories mapped from OpenWeatherMap condition ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_owm_id(id: u16) -> Self {
        match id {
            200..=232 => Self::Thunderstorm,
            300..=321 => Self::Drizzle,
            502..=504 | 522 | 531 => Self::HeavyRain,
            511 => Self::Sleet, // Freezing rain
            500..=531 => Self::Rain,
            611..=616 => Self::Sleet,
            600..=622 => Self::Snow,
            701..=781 => Self::Fog,
            801 | 802 => Self::PartlyCloudy,
            803 | 804 => Self::Cloudy,
            _ => Self::Clear,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }
}

/// Provider-reported condition for one observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: WeatherCondition,
    /// Short group name, e.g. "Clouds"
    pub main: String,
    /// Provider icon code, e.g. "04d"
    pub icon: String,
}

/// Current weather conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Position the provider resolved the request to
    pub position: Position,
    /// Provider's own name for the place, if any
    pub place_name: Option<String>,
    pub observed_at: DateTime<Utc>,
    /// Shift from UTC at the observed location, in seconds
    pub utc_offset_secs: i32,
    pub condition: Condition,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub wind_speed: f64,
}

/// One 3-hour forecast step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub at: DateTime<Utc>,
    pub condition: Condition,
    pub temperature: f64,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub utc_offset_secs: i32,
    pub entries: Vec<ForecastEntry>,
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
}

/// Weather and geocoding client errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Provider returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Weather API key not configured")]
    MissingApiKey,
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        use skycast_core::WeatherError as Ui;
        match e {
            WeatherError::Network(e) => AppError::Network(e.into_network_error()),
            WeatherError::Status { status: 401, .. } => AppError::Weather(Ui::InvalidApiKey),
            WeatherError::Status { status: 404, message } => {
                AppError::Weather(Ui::LocationNotFound(message))
            }
            WeatherError::Status { status, .. } if status >= 500 => {
                AppError::Weather(Ui::ServiceUnavailable)
            }
            WeatherError::Status { status, message } => {
                AppError::Weather(Ui::ApiError(format!("{}: {}", status, message)))
            }
            WeatherError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
            WeatherError::MissingApiKey => AppError::Weather(Ui::InvalidApiKey),
        }
    }
}
