use std::sync::Arc;

use anyhow::Result;
use skycast_core::{AppError, Config};
use skycast_search::{
    SearchController, SharedPresenter, SuggestionEntry, SuggestionEvent, SuggestionPresenter,
};
use skycast_weather::{
    resolve_start_position, ConfiguredLocation, Dashboard, Geocoder, NominatimGeocoder, Position,
    WeatherProvider,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;

    let (config, _) = match Config::load_validated() {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            let err = AppError::from(e);
            println!("{}", err.user_message());
            return Err(err.into());
        }
    };

    let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimGeocoder::new(&config.geocoding)?);
    let dashboard = match WeatherProvider::new(&config.weather) {
        Ok(provider) => Some(Arc::new(Dashboard::new(
            Arc::new(provider),
            geocoder.clone(),
            config.weather.forecast_hours,
        ))),
        Err(e) => {
            tracing::warn!("Weather disabled: {}", e);
            println!("{}", AppError::from(e).user_message());
            None
        }
    };

    let (tx, mut events) = mpsc::unbounded_channel();
    let presenter = SuggestionPresenter::with_events(tx).shared();
    let mut controller = SearchController::new(geocoder, presenter.clone(), &config.search);

    let start = resolve_start_position(
        &ConfiguredLocation::from_config(&config.location),
        Position::from(config.location.fallback),
    )
    .await;
    refresh(dashboard.clone(), start);

    tracing::info!("SkyCast started");
    println!("Type a place name to search, #N to pick a suggestion, Ctrl-C to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => handle_line(&mut controller, &presenter, &line),
                None => break,
            },
            Some(event) = events.recv() => match event {
                SuggestionEvent::ListChanged { entries, invalid } => {
                    print_entries(&entries, invalid)
                }
                SuggestionEvent::LocationSelected(position) => refresh(dashboard.clone(), position),
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    controller.cancel_pending();
    tracing::info!("Shutting down");
    Ok(())
}

/// `#N` activates the N-th suggestion; anything else is typed text.
fn handle_line(controller: &mut SearchController, presenter: &SharedPresenter, line: &str) {
    let pick = line
        .trim()
        .strip_prefix('#')
        .and_then(|n| n.trim().parse::<usize>().ok());

    let Some(n) = pick else {
        controller.on_input(line);
        return;
    };

    let entry = n
        .checked_sub(1)
        .and_then(|i| presenter.lock().entries().get(i).cloned());
    match entry {
        Some(entry) => {
            if let Err(e) = presenter.lock().activate(entry.key) {
                println!("Cannot select that suggestion: {}", e);
            }
        }
        None => println!("No suggestion #{}", n),
    }
}

fn print_entries(entries: &[SuggestionEntry], invalid: bool) {
    if invalid {
        println!("  (no matching places)");
        return;
    }
    for (i, entry) in entries.iter().enumerate() {
        println!("  #{} {}", i + 1, entry.label);
    }
}

fn refresh(dashboard: Option<Arc<Dashboard>>, position: Position) {
    let Some(dashboard) = dashboard else {
        return;
    };
    tokio::spawn(async move {
        match dashboard.update(position).await {
            Ok(report) => println!("\n{}", report),
            Err(e) => {
                tracing::error!("Weather update failed: {}", e);
                println!("{}", AppError::from(e).user_message());
            }
        }
    });
}
