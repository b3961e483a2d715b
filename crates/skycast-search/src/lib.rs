//! Debounced location autocomplete.
//!
//! [`SearchController`] turns raw keystrokes into at most one geocoder
//! lookup per quiet window; [`SuggestionPresenter`] holds the resulting
//! suggestion list and turns an activated entry into a chosen location.

pub mod controller;
pub mod debounce;
pub mod presenter;

pub use controller::SearchController;
pub use debounce::Debouncer;
pub use presenter::{
    SelectionError, SelectionKey, SharedPresenter, SuggestionEntry, SuggestionEvent,
    SuggestionPresenter,
};
