//! Search history recording.

use crate::StateStore;

pub const SEARCH_HISTORY_KEY: &str = "search_history";

/// Most-recent-first cap on stored searches.
pub const MAX_HISTORY_ENTRIES: usize = 20;

/// Record a search, most recent first. Repeated queries are not duplicated.
pub async fn record_search(store: &StateStore, query: &str) -> anyhow::Result<()> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(());
    }
    let mut history: Vec<String> = store.get(SEARCH_HISTORY_KEY).await?.unwrap_or_default();
    if history.iter().any(|entry| entry == query) {
        return Ok(());
    }
    history.insert(0, query.to_string());
    history.truncate(MAX_HISTORY_ENTRIES);
    store.set(SEARCH_HISTORY_KEY, &history).await
}

pub async fn search_history(store: &StateStore) -> anyhow::Result<Vec<String>> {
    Ok(store.get(SEARCH_HISTORY_KEY).await?.unwrap_or_default())
}
