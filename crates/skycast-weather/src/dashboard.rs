//! Weather report assembly for a chosen location.

use std::fmt;
use std::sync::Arc;

use skycast_core::Units;

use crate::format::{
    format_date, format_hour, format_temperature, format_wind, icon_url, local_time, weekday_name,
};
use crate::geocode::Geocoder;
use crate::provider::WeatherProvider;
use crate::types::{CurrentWeather, Forecast, Position, WeatherCondition, WeatherError};

/// One row of the hourly forecast strip
#[derive(Debug, Clone, PartialEq)]
pub struct HourRow {
    pub time: String,
    pub icon_url: String,
    pub description: String,
    pub temperature: String,
    pub wind: String,
}

/// Everything the page shows for one location, already formatted
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Reverse-geocoded place label; falls back to the provider's name
    pub place: Option<String>,
    pub position: Position,
    pub date: String,
    pub condition: WeatherCondition,
    pub description: String,
    pub icon_url: String,
    pub temperature: String,
    pub min_temperature: String,
    pub max_temperature: String,
    pub wind: String,
    /// Weekday of the first forecast row
    pub forecast_day: Option<String>,
    pub hours: Vec<HourRow>,
}

impl WeatherReport {
    pub fn build(
        current: &CurrentWeather,
        forecast: &Forecast,
        place: Option<String>,
        units: Units,
        max_hours: usize,
    ) -> Self {
        let observed = local_time(current.observed_at, current.utc_offset_secs);

        let hours = forecast
            .entries
            .iter()
            .take(max_hours)
            .map(|entry| HourRow {
                time: format_hour(&local_time(entry.at, forecast.utc_offset_secs)),
                icon_url: icon_url(&entry.condition.icon, 2),
                description: entry.condition.main.clone(),
                temperature: format_temperature(entry.temperature, units),
                wind: format_wind(entry.wind_speed, units),
            })
            .collect();

        Self {
            place: place.or_else(|| current.place_name.clone()),
            position: current.position,
            date: format_date(&observed),
            condition: current.condition.kind,
            description: current.condition.main.clone(),
            icon_url: icon_url(&current.condition.icon, 4),
            temperature: format_temperature(current.temperature, units),
            min_temperature: format_temperature(current.temp_min, units),
            max_temperature: format_temperature(current.temp_max, units),
            wind: format_wind(current.wind_speed, units),
            forecast_day: forecast
                .entries
                .first()
                .map(|e| weekday_name(&local_time(e.at, forecast.utc_offset_secs))),
            hours,
        }
    }
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.place {
            Some(place) => writeln!(f, "{} ({})", place, self.date)?,
            None => writeln!(f, "{} ({})", self.position, self.date)?,
        }
        writeln!(
            f,
            "  {} ({})  {} (min {}, max {})  wind {}",
            self.condition.description(),
            self.description,
            self.temperature,
            self.min_temperature,
            self.max_temperature,
            self.wind
        )?;
        if let Some(day) = &self.forecast_day {
            writeln!(f, "  {}:", day)?;
        }
        for hour in &self.hours {
            writeln!(
                f,
                "    {}  {:<12} {:>8}  {}",
                hour.time, hour.description, hour.temperature, hour.wind
            )?;
        }
        Ok(())
    }
}

/// Fetches and assembles the weather report whenever the location changes.
pub struct Dashboard {
    provider: Arc<WeatherProvider>,
    geocoder: Arc<dyn Geocoder>,
    forecast_hours: usize,
}

impl Dashboard {
    pub fn new(
        provider: Arc<WeatherProvider>,
        geocoder: Arc<dyn Geocoder>,
        forecast_hours: usize,
    ) -> Self {
        Self {
            provider,
            geocoder,
            forecast_hours,
        }
    }

    /// Fetch current weather and forecast concurrently, then label the
    /// provider-reported position.
    pub async fn update(&self, position: Position) -> Result<WeatherReport, WeatherError> {
        tracing::info!("Updating weather for {}", position);

        let (current, forecast) = tokio::try_join!(
            self.provider.current(position),
            self.provider.forecast(position)
        )?;

        let place = self.geocoder.reverse(current.position).await;

        Ok(WeatherReport::build(
            &current,
            &forecast,
            place,
            self.provider.units(),
            self.forecast_hours,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoxFuture, Condition, ForecastEntry, SuggestionItem};
    use chrono::{TimeZone, Utc};
    use skycast_core::WeatherConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedLabel(Option<&'static str>);

    impl Geocoder for FixedLabel {
        fn search(&self, _query: String, _limit: usize) -> BoxFuture<'_, Vec<SuggestionItem>> {
            Box::pin(async { Vec::new() })
        }

        fn reverse(&self, _position: Position) -> BoxFuture<'_, Option<String>> {
            let label = self.0.map(str::to_string);
            Box::pin(async move { label })
        }
    }

    fn sample_current() -> CurrentWeather {
        CurrentWeather {
            position: Position::new(48.85, 2.35),
            place_name: Some("Paris".into()),
            observed_at: Utc.with_ymd_and_hms(2024, 3, 10, 11, 0, 0).unwrap(),
            utc_offset_secs: 3600,
            condition: Condition {
                kind: WeatherCondition::Cloudy,
                main: "Clouds".into(),
                icon: "04d".into(),
            },
            temperature: 14.27,
            temp_min: 12.91,
            temp_max: 15.64,
            wind_speed: 4.12,
        }
    }

    fn sample_forecast(rows: usize) -> Forecast {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        Forecast {
            utc_offset_secs: 3600,
            entries: (0..rows)
                .map(|i| ForecastEntry {
                    at: start + chrono::Duration::hours(3 * i as i64),
                    condition: Condition {
                        kind: WeatherCondition::Rain,
                        main: "Rain".into(),
                        icon: "10d".into(),
                    },
                    temperature: 10.0 + i as f64,
                    wind_speed: 2.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_build_report_formats_current_conditions() {
        let report = WeatherReport::build(
            &sample_current(),
            &sample_forecast(3),
            Some("Paris, Île-de-France, France".into()),
            Units::Metric,
            8,
        );

        assert_eq!(report.place.as_deref(), Some("Paris, Île-de-France, France"));
        assert_eq!(report.date, "10.03.2024");
        assert_eq!(report.description, "Clouds");
        assert_eq!(report.icon_url, "https://openweathermap.org/img/wn/04d@4x.png");
        assert_eq!(report.temperature, "14.3°C");
        assert_eq!(report.min_temperature, "12.9°C");
        assert_eq!(report.max_temperature, "15.6°C");
        assert_eq!(report.wind, "4.1 m/s");
        assert_eq!(report.forecast_day.as_deref(), Some("Sunday"));
    }

    #[test]
    fn test_build_report_limits_hours() {
        let report =
            WeatherReport::build(&sample_current(), &sample_forecast(10), None, Units::Metric, 4);

        assert_eq!(report.hours.len(), 4);
        assert_eq!(report.hours[0].time, "13:00");
        assert_eq!(report.hours[1].time, "16:00");
        assert_eq!(report.hours[0].icon_url, "https://openweathermap.org/img/wn/10d@2x.png");
        assert_eq!(report.hours[3].temperature, "13°C");
        // Provider name used when reverse lookup is unresolved
        assert_eq!(report.place.as_deref(), Some("Paris"));
    }

    #[test]
    fn test_empty_forecast_has_no_day() {
        let report =
            WeatherReport::build(&sample_current(), &sample_forecast(0), None, Units::Metric, 8);
        assert!(report.forecast_day.is_none());
        assert!(report.hours.is_empty());
    }

    #[test]
    fn test_display_lists_hours() {
        let report = WeatherReport::build(
            &sample_current(),
            &sample_forecast(2),
            Some("Paris".into()),
            Units::Metric,
            8,
        );
        let text = report.to_string();
        assert!(text.starts_with("Paris (10.03.2024)"));
        assert!(text.contains("Cloudy (Clouds)  14.3°C (min 12.9°C, max 15.6°C)  wind 4.1 m/s"));
        assert!(text.contains("13:00"));
        assert!(text.contains("16:00"));
    }

    #[tokio::test]
    async fn test_update_fetches_both_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "coord": {"lat": 48.85, "lon": 2.35},
                "weather": [{"id": 800, "main": "Clear", "icon": "01d"}],
                "main": {"temp": 20.0, "temp_min": 18.0, "temp_max": 22.0},
                "wind": {"speed": 1.0},
                "dt": 1_710_068_400,
                "timezone": 3600,
                "name": "Paris"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": [
                    {"dt": 1_710_072_000, "main": {"temp": 21.0},
                     "weather": [{"id": 800, "main": "Clear", "icon": "01d"}],
                     "wind": {"speed": 1.2}}
                ],
                "city": {"timezone": 3600}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = WeatherConfig {
            base_url: server.uri(),
            api_key: Some("test-key".into()),
            ..WeatherConfig::default()
        };
        let provider = Arc::new(WeatherProvider::new(&config).unwrap());
        let dashboard = Dashboard::new(provider, Arc::new(FixedLabel(Some("Paris, France"))), 8);

        let report = dashboard.update(Position::new(48.85, 2.35)).await.unwrap();

        assert_eq!(report.place.as_deref(), Some("Paris, France"));
        assert_eq!(report.condition, WeatherCondition::Clear);
        assert_eq!(report.temperature, "20°C");
        assert_eq!(report.hours.len(), 1);
    }

    #[tokio::test]
    async fn test_update_propagates_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = WeatherConfig {
            base_url: server.uri(),
            api_key: Some("test-key".into()),
            ..WeatherConfig::default()
        };
        let provider = Arc::new(WeatherProvider::new(&config).unwrap());
        let dashboard = Dashboard::new(provider, Arc::new(FixedLabel(None)), 8);

        let err = dashboard.update(Position::new(0.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, WeatherError::Status { status: 500, .. }));
    }
}
