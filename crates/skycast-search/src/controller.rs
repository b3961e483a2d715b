//! Debounced search controller: keystrokes in, geocoder lookups out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use skycast_core::{CompletionPolicy, SearchConfig};
use skycast_weather::Geocoder;

use crate::debounce::Debouncer;
use crate::presenter::SharedPresenter;

/// Owns the search box's input events.
///
/// Each `on_input` reschedules a single pending lookup; when the quiet window
/// passes, the geocoder is queried with the text captured at that call and the
/// results are handed to the presenter.
pub struct SearchController {
    debouncer: Debouncer,
    geocoder: Arc<dyn Geocoder>,
    presenter: SharedPresenter,
    limit: usize,
    policy: CompletionPolicy,
    /// Sequence number of the most recently scheduled lookup
    issued: Arc<AtomicU64>,
}

impl SearchController {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        presenter: SharedPresenter,
        config: &SearchConfig,
    ) -> Self {
        Self {
            debouncer: Debouncer::new(config.quiet_window()),
            geocoder,
            presenter,
            limit: config.result_limit,
            policy: config.completion_policy,
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handle a change of the search box text.
    pub fn on_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.presenter.lock().set_input_text(text.as_str());

        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let geocoder = self.geocoder.clone();
        let presenter = self.presenter.clone();
        let issued = self.issued.clone();
        let limit = self.limit;
        let policy = self.policy;

        self.debouncer.call(async move {
            let items = if text.trim().is_empty() {
                Vec::new()
            } else {
                tracing::debug!("Searching for {:?} (lookup #{})", text, seq);
                geocoder.search(text, limit).await
            };

            if policy == CompletionPolicy::LatestRequest {
                let latest = issued.load(Ordering::SeqCst);
                if latest != seq {
                    tracing::debug!(
                        "Discarding results of lookup #{} (latest is #{})",
                        seq,
                        latest
                    );
                    return;
                }
            }

            presenter.lock().show_results(items);
        });
    }

    /// Drop the pending lookup, if it has not fired yet.
    pub fn cancel_pending(&mut self) -> bool {
        self.debouncer.cancel()
    }

    /// True while a lookup is scheduled but has not fired.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn presenter(&self) -> &SharedPresenter {
        &self.presenter
    }
}
