//! Display formatting for weather values.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use skycast_core::Units;

/// Decimal places shown for temperatures and wind speed.
pub const DEFAULT_PRECISION: u32 = 1;

/// Round `value` to `precision` decimal places. Values that round to zero
/// come back as positive zero so they never display as "-0".
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Convert a UTC instant to the wall clock of a location `offset_secs` east of UTC.
/// Offsets outside ±24h are treated as UTC.
pub fn local_time(at: DateTime<Utc>, offset_secs: i32) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(offset_secs).unwrap_or_else(|| Utc.fix());
    at.with_timezone(&offset)
}

/// `dd.mm.yyyy`
pub fn format_date(at: &DateTime<FixedOffset>) -> String {
    at.format("%d.%m.%Y").to_string()
}

/// `HH:00`
pub fn format_hour(at: &DateTime<FixedOffset>) -> String {
    at.format("%H:00").to_string()
}

/// English weekday name, e.g. "Sunday"
pub fn weekday_name(at: &DateTime<FixedOffset>) -> String {
    at.format("%A").to_string()
}

pub fn format_temperature(value: f64, units: Units) -> String {
    format!(
        "{}{}",
        round_to(value, DEFAULT_PRECISION),
        units.temperature_suffix()
    )
}

pub fn format_wind(value: f64, units: Units) -> String {
    format!("{} {}", round_to(value, DEFAULT_PRECISION), units.wind_suffix())
}

/// Provider icon image URL; `scale` is 2 for list rows and 4 for the headline.
pub fn icon_url(icon: &str, scale: u8) -> String {
    format!("https://openweathermap.org/img/wn/{}@{}x.png", icon, scale)
}
