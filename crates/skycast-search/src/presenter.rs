//! Suggestion list presenter: render model for the search box and its
//! result list.

use std::sync::Arc;

use parking_lot::Mutex;
use skycast_weather::{Position, SuggestionItem};
use tokio::sync::mpsc;

/// Presenter shared between the controller's lookup tasks and the front end.
pub type SharedPresenter = Arc<Mutex<SuggestionPresenter>>;

/// Opaque handle for one rendered entry.
///
/// Only valid while the list it was rendered from is displayed; any list
/// replacement or selection invalidates every outstanding key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    generation: u64,
    index: usize,
}

impl SelectionKey {
    /// Position of the entry in its list
    pub fn index(&self) -> usize {
        self.index
    }
}

/// One rendered suggestion
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionEntry {
    pub key: SelectionKey,
    pub label: String,
}

/// Notifications for the front end
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionEvent {
    /// The rendered list was replaced or cleared
    ListChanged {
        entries: Vec<SuggestionEntry>,
        invalid: bool,
    },
    /// The user committed a suggestion
    LocationSelected(Position),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Selection key belongs to a list that is no longer displayed")]
    Stale,
    #[error("Selection index {index} out of range for {len} entries")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, Default)]
pub struct SuggestionPresenter {
    items: Vec<SuggestionItem>,
    generation: u64,
    invalid: bool,
    input_text: String,
    events: Option<mpsc::UnboundedSender<SuggestionEvent>>,
}

impl SuggestionPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presenter that reports list changes and selections on `events`.
    pub fn with_events(events: mpsc::UnboundedSender<SuggestionEvent>) -> Self {
        Self {
            events: Some(events),
            ..Self::default()
        }
    }

    pub fn shared(self) -> SharedPresenter {
        Arc::new(Mutex::new(self))
    }

    /// Replace the displayed list with `items`.
    ///
    /// An empty result marks the input invalid and renders nothing.
    pub fn show_results(&mut self, items: Vec<SuggestionItem>) {
        self.generation += 1;
        self.invalid = items.is_empty();
        self.items = items;

        if self.invalid {
            tracing::debug!("No suggestions, marking input invalid");
        } else {
            tracing::debug!("Showing {} suggestions", self.items.len());
        }
        self.emit_list();
    }

    /// Commit the entry behind `key`: copy its label into the input, clear
    /// the list and emit its position.
    pub fn activate(&mut self, key: SelectionKey) -> Result<Position, SelectionError> {
        if key.generation != self.generation {
            tracing::warn!("Ignoring stale suggestion key {:?}", key);
            return Err(SelectionError::Stale);
        }
        let len = self.items.len();
        let Some(item) = self.items.get(key.index) else {
            tracing::warn!("Suggestion index {} out of range ({} entries)", key.index, len);
            return Err(SelectionError::OutOfRange {
                index: key.index,
                len,
            });
        };

        let position = item.position;
        self.input_text = item.label.clone();
        self.items.clear();
        self.generation += 1;

        tracing::info!("Selected {} ({})", self.input_text, position);
        self.emit_list();
        self.emit(SuggestionEvent::LocationSelected(position));
        Ok(position)
    }

    /// Rendered entries for the current list.
    pub fn entries(&self) -> Vec<SuggestionEntry> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| SuggestionEntry {
                key: SelectionKey {
                    generation: self.generation,
                    index,
                },
                label: item.label.clone(),
            })
            .collect()
    }

    /// Item behind `key`, if the key is still valid.
    pub fn item(&self, key: SelectionKey) -> Option<&SuggestionItem> {
        if key.generation != self.generation {
            return None;
        }
        self.items.get(key.index)
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    /// Mirror what the user typed into the input.
    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.input_text = text.into();
    }

    fn emit_list(&self) {
        self.emit(SuggestionEvent::ListChanged {
            entries: self.entries(),
            invalid: self.invalid,
        });
    }

    fn emit(&self, event: SuggestionEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                tracing::debug!("Suggestion event receiver dropped");
            }
        }
    }
}
