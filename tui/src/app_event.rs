//! Application-level events used to coordinate UI actions.
//!
//! `AppEvent` is the internal message bus between the composer, the
//! suggestion session and the top-level `App` loop. Widgets emit events to
//! request actions that must be handled at the app layer without reaching
//! into `App` internals.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AppEvent {
    /// The free-text query changed; the app forwards it to the debounced
    /// suggestion session. An empty query invalidates pending fetches.
    ScheduleSuggestFetch(String),

    /// Candidates arrived for `query`. The composer discards them unless
    /// `query` still matches its current text.
    SuggestResult {
        query: String,
        candidates: Vec<String>,
    },

    /// Show a transient message to the user (dispatch results, usage hints,
    /// unknown commands, update notices).
    Notice(String),

    /// Fired a grace period after the terminal lost focus; the composer
    /// dismisses its popup if focus never came back.
    BlurCheck,

    /// Navigate to a search destination.
    OpenUrl(String),

    /// Request to exit the application.
    Exit,
}
