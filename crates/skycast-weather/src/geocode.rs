//! Forward and reverse geocoding.
//! Uses Nominatim (OpenStreetMap) - free, no API key required, but rate
//! limited, which is why typed searches are debounced upstream.

use crate::types::{BoxFuture, Position, SuggestionItem, WeatherError};
use reqwest::Client;
use serde::Deserialize;
use skycast_core::GeocodingConfig;

/// Location lookup capability injected into the search controller and the
/// dashboard.
///
/// Failures never surface here: a transport or provider error is an empty
/// result (`search`) or an unresolved label (`reverse`).
pub trait Geocoder: Send + Sync + 'static {
    /// Resolve free text to at most `limit` candidate locations.
    fn search(&self, query: String, limit: usize) -> BoxFuture<'_, Vec<SuggestionItem>>;

    /// Resolve a position to a human-readable label.
    fn reverse(&self, position: Position) -> BoxFuture<'_, Option<String>>;
}

/// Address details as returned with `addressdetails=1`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Address {
    pub hamlet: Option<String>,
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// Most specific place name: hamlet > village > town > city > state > region.
    pub fn subject(&self) -> Option<&str> {
        self.hamlet
            .as_deref()
            .or(self.village.as_deref())
            .or(self.town.as_deref())
            .or(self.city.as_deref())
            .or(self.state.as_deref())
            .or(self.region.as_deref())
    }

    /// "subject, state, country", skipping parts that are missing or repeat
    /// the subject. `None` when no subject field is present.
    pub fn label(&self) -> Option<String> {
        let subject = self.subject()?;
        let mut parts = vec![subject];
        for part in [self.state.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
        {
            if !part.is_empty() && part != subject {
                parts.push(part);
            }
        }
        Some(parts.join(", "))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: Option<String>,
    address: Option<Address>,
}

impl SearchResult {
    fn into_item(self) -> Option<SuggestionItem> {
        let position = Position::new(self.lat.parse().ok()?, self.lon.parse().ok()?);
        let label = self
            .address
            .as_ref()
            .and_then(Address::label)
            .or(self.display_name)?;
        Some(SuggestionItem { label, position })
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResult {
    address: Option<Address>,
}

/// Nominatim HTTP client
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn try_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SuggestionItem>, WeatherError> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                message: format!("search for {:?} failed", query),
            });
        }

        let results: Vec<SearchResult> = response.json().await?;
        let total = results.len();
        let items: Vec<SuggestionItem> = results
            .into_iter()
            .filter_map(SearchResult::into_item)
            .collect();

        if items.len() < total {
            tracing::debug!(
                "Dropped {} unusable search results for {:?}",
                total - items.len(),
                query
            );
        }
        Ok(items)
    }

    async fn try_reverse(&self, position: Position) -> Result<Option<String>, WeatherError> {
        let lat = position.lat.to_string();
        let lon = position.lon.to_string();
        let response = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("format", "json"),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("zoom", "14"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                message: format!("reverse lookup for {} failed", position),
            });
        }

        let body: ReverseResult = response.json().await?;
        Ok(body.address.as_ref().and_then(Address::label))
    }
}

impl Geocoder for NominatimGeocoder {
    fn search(&self, query: String, limit: usize) -> BoxFuture<'_, Vec<SuggestionItem>> {
        Box::pin(async move {
            match self.try_search(&query, limit).await {
                Ok(items) => {
                    tracing::debug!("Search {:?} returned {} results", query, items.len());
                    items
                }
                Err(e) => {
                    tracing::warn!("Location search failed: {}", e);
                    Vec::new()
                }
            }
        })
    }

    fn reverse(&self, position: Position) -> BoxFuture<'_, Option<String>> {
        Box::pin(async move {
            match self.try_reverse(position).await {
                Ok(label) => {
                    if let Some(label) = &label {
                        tracing::info!("Reverse geocoded to: {}", label);
                    }
                    label
                }
                Err(e) => {
                    tracing::debug!("Reverse geocode failed: {}", e);
                    None
                }
            }
        })
    }
}
