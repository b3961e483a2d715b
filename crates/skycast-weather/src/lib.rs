//! Weather and geocoding services for SkyCast
//!
//! Location lookup goes through Nominatim (OpenStreetMap); weather data
//! comes from OpenWeatherMap. Both are reached asynchronously and are
//! injected into the components that use them.

pub mod dashboard;
pub mod format;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod types;

pub use dashboard::{Dashboard, HourRow, WeatherReport};
pub use geocode::{Address, Geocoder, NominatimGeocoder};
pub use location::{resolve_start_position, ConfiguredLocation, LocationSource};
pub use provider::WeatherProvider;
pub use types::*;
