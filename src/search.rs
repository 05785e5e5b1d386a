//! Incremental search against the food collection. The primary path is a
//! backend full-text query on `name`; when the backend has no fulltext
//! index there, a bounded scan with client-side substring filtering takes
//! over. Errors never escape this module: exhausted fallbacks degrade to an
//! empty result set.

use leptos::logging::{error, warn};

use crate::models::food::Food;
use crate::store::{Collection, DocumentStore, ErrorKind, Query};

pub const SEARCH_LIMIT: usize = 10;
pub const SCAN_LIMIT: usize = 50;
pub const DEBOUNCE_MS: u64 = 250;

/// Resolves a free-text query into at most `SEARCH_LIMIT` matching foods.
/// An empty or whitespace-only query yields an empty result set without
/// issuing any network call.
pub async fn resolve_query<S: DocumentStore>(store: &S, raw: &str) -> Vec<Food> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let primary = [
        Query::Search("name".to_string(), trimmed.to_string()),
        Query::Limit(SEARCH_LIMIT),
    ];
    match store.list_documents(Collection::Food, &primary).await {
        Ok(docs) => Food::from_docs(docs),
        Err(err) if err.kind == ErrorKind::MissingIndex => {
            warn!("[SEARCH] No fulltext index on name, scanning instead: {err}");
            scan_and_filter(store, trimmed).await
        }
        Err(err) => {
            error!("[SEARCH] Query failed: {err}");
            Vec::new()
        }
    }
}

/// Fallback path: fetch the first `SCAN_LIMIT` foods unfiltered and match
/// client-side. Result order is the backend's default order, not relevance.
async fn scan_and_filter<S: DocumentStore>(store: &S, query: &str) -> Vec<Food> {
    match store
        .list_documents(Collection::Food, &[Query::Limit(SCAN_LIMIT)])
        .await
    {
        Ok(docs) => filter_by_name(Food::from_docs(docs), query),
        Err(err) => {
            error!("[SEARCH] Fallback scan failed: {err}");
            Vec::new()
        }
    }
}

/// Case-insensitive substring match on the name field, capped at
/// `SEARCH_LIMIT` matches.
pub fn filter_by_name(foods: Vec<Food>, query: &str) -> Vec<Food> {
    let needle = query.to_lowercase();
    foods
        .into_iter()
        .filter(|food| food.name.to_lowercase().contains(&needle))
        .take(SEARCH_LIMIT)
        .collect()
}
