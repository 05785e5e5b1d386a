//! End-to-end tests for the incremental search resolver: primary full-text
//! path, index-missing fallback scan, and silent degradation.

use serde_json::{json, Value};

use foodrate::search::{resolve_query, SCAN_LIMIT, SEARCH_LIMIT};
use foodrate::store::memory::MemoryStore;
use foodrate::store::{Collection, Query};

fn food_doc(id: &str, name: &str) -> Value {
    json!({
        "$id": id,
        "name": name,
        "imageUrl": "https://img.example/x.png",
        "description": "desc",
    })
}

#[tokio::test]
async fn empty_query_issues_no_network_call() {
    let store = MemoryStore::new();
    store.insert(Collection::Food, food_doc("f1", "Ramen"));

    assert!(resolve_query(&store, "").await.is_empty());
    assert!(resolve_query(&store, "   \t ").await.is_empty());
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn primary_path_sends_one_search_query_with_limit_ten() {
    let store = MemoryStore::new();
    store.insert(Collection::Food, food_doc("f1", "Ramen"));
    store.insert(Collection::Food, food_doc("f2", "Burger"));

    let found = resolve_query(&store, "  ramen ").await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "f1");

    let lists = store.list_calls(Collection::Food);
    assert_eq!(lists.len(), 1);
    assert_eq!(
        lists[0],
        vec![
            Query::Search("name".to_string(), "ramen".to_string()),
            Query::Limit(SEARCH_LIMIT),
        ]
    );
}

#[tokio::test]
async fn missing_index_falls_back_to_one_bounded_scan() {
    let store = MemoryStore::new();
    store.insert(Collection::Food, food_doc("f1", "Miso RAMEN"));
    store.insert(Collection::Food, food_doc("f2", "Burger"));
    store.insert(Collection::Food, food_doc("f3", "ramen bowl"));
    store.fail_search_with("Fulltext index not found on attribute: name");

    let found = resolve_query(&store, "Ramen").await;
    let ids: Vec<&str> = found.iter().map(|f| f.id.as_str()).collect();
    // Backend default order, filtered case-insensitively client-side.
    assert_eq!(ids, ["f1", "f3"]);

    let lists = store.list_calls(Collection::Food);
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[1], vec![Query::Limit(SCAN_LIMIT)]);
}

#[tokio::test]
async fn fallback_scan_caps_results_at_ten() {
    let store = MemoryStore::new();
    for i in 0..30 {
        store.insert(Collection::Food, food_doc(&format!("f{i:02}"), "Ramen"));
    }
    store.fail_search_with("Fulltext index not found on attribute: name");

    let found = resolve_query(&store, "ramen").await;
    assert_eq!(found.len(), SEARCH_LIMIT);
}

#[tokio::test]
async fn exhausted_fallback_degrades_to_empty() {
    let store = MemoryStore::new();
    store.insert(Collection::Food, food_doc("f1", "Ramen"));
    // Both the primary query and the scan fail with the index error.
    store.fail_lists_with("Fulltext index not found on attribute: name");

    let found = resolve_query(&store, "ramen").await;
    assert!(found.is_empty());
    // Primary plus exactly one secondary scan, nothing more.
    assert_eq!(store.list_calls(Collection::Food).len(), 2);
}

#[tokio::test]
async fn other_errors_degrade_to_empty_without_a_scan() {
    let store = MemoryStore::new();
    store.insert(Collection::Food, food_doc("f1", "Ramen"));
    store.fail_search_with("Server Error");

    let found = resolve_query(&store, "ramen").await;
    assert!(found.is_empty());
    assert_eq!(store.list_calls(Collection::Food).len(), 1);
}
