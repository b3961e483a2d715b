//! OpenWeatherMap client: current conditions and the 5 day / 3 hour forecast.

use crate::types::{
    Condition, CurrentWeather, Forecast, ForecastEntry, Position, WeatherCondition, WeatherError,
};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use skycast_core::{Units, WeatherConfig};

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    id: u16,
    main: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    coord: OwmCoord,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    main: OwmMain,
    #[serde(default)]
    wind: OwmWind,
    dt: i64,
    #[serde(default)]
    timezone: i32,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: OwmWind,
}

#[derive(Debug, Default, Deserialize)]
struct OwmCity {
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwmForecast {
    list: Vec<OwmForecastItem>,
    #[serde(default)]
    city: OwmCity,
}

fn condition(weather: Vec<OwmCondition>) -> Condition {
    weather
        .into_iter()
        .next()
        .map(|w| Condition {
            kind: WeatherCondition::from_owm_id(w.id),
            main: w.main,
            icon: w.icon,
        })
        .unwrap_or_default()
}

fn timestamp(dt: i64) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(dt, 0)
        .ok_or_else(|| WeatherError::Parse(format!("timestamp out of range: {}", dt)))
}

/// Async weather client. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
    api_key: String,
    units: Units,
}

impl WeatherProvider {
    /// Build a provider from config. Fails if no API key is available.
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let api_key = config.api_key().ok_or(WeatherError::MissingApiKey)?;
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            units: config.units,
        })
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub async fn current(&self, position: Position) -> Result<CurrentWeather, WeatherError> {
        let body: OwmCurrent = self.get("weather", position).await?;

        Ok(CurrentWeather {
            position: Position::new(body.coord.lat, body.coord.lon),
            place_name: body.name.filter(|n| !n.is_empty()),
            observed_at: timestamp(body.dt)?,
            utc_offset_secs: body.timezone,
            condition: condition(body.weather),
            temperature: body.main.temp,
            temp_min: body.main.temp_min.unwrap_or(body.main.temp),
            temp_max: body.main.temp_max.unwrap_or(body.main.temp),
            wind_speed: body.wind.speed,
        })
    }

    pub async fn forecast(&self, position: Position) -> Result<Forecast, WeatherError> {
        let body: OwmForecast = self.get("forecast", position).await?;

        let entries = body
            .list
            .into_iter()
            .map(|item| {
                Ok(ForecastEntry {
                    at: timestamp(item.dt)?,
                    condition: condition(item.weather),
                    temperature: item.main.temp,
                    wind_speed: item.wind.speed,
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        Ok(Forecast {
            utc_offset_secs: body.city.timezone,
            entries,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        position: Position,
    ) -> Result<T, WeatherError> {
        let lat = position.lat.to_string();
        let lon = position.lon.to_string();

        tracing::debug!("Fetching {} for {}", endpoint, position);

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", self.units.as_query()),
                ("APPID", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Weather {} returned status {}", endpoint, status);
            return Err(WeatherError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))
    }
}
