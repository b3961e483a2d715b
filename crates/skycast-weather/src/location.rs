//! Start-up position resolution.

use crate::types::{BoxFuture, LocationError, Position};
use skycast_core::LocationConfig;

/// Source of the user's current position (device geolocation, fixed config...).
pub trait LocationSource: Send + Sync {
    fn current_position(&self) -> BoxFuture<'_, Result<Position, LocationError>>;
}

/// Position pinned in the config file, if any.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    position: Option<Position>,
}

impl ConfiguredLocation {
    pub fn new(position: Option<Position>) -> Self {
        Self { position }
    }

    pub fn from_config(config: &LocationConfig) -> Self {
        Self::new(config.fixed.map(Position::from))
    }
}

impl LocationSource for ConfiguredLocation {
    fn current_position(&self) -> BoxFuture<'_, Result<Position, LocationError>> {
        let position = self.position.ok_or(LocationError::ServiceUnavailable);
        Box::pin(async move { position })
    }
}

/// Ask `source` for a position, falling back when it is unavailable.
pub async fn resolve_start_position(source: &dyn LocationSource, fallback: Position) -> Position {
    match source.current_position().await {
        Ok(position) => {
            tracing::info!("Got location: {}", position);
            position
        }
        Err(e) => {
            tracing::info!("{}; using default location {}", e, fallback);
            fallback
        }
    }
}
