//! End-to-end tests for the review aggregator against the in-memory
//! document store: pagination bounds, ranking, food resolution, and the
//! per-id fallback fetch.

use serde_json::{json, Value};

use foodrate::stats::{load_home_stats, LEADERBOARD_SIZE, MAX_PAGES, PAGE_SIZE};
use foodrate::store::memory::{Call, MemoryStore};
use foodrate::store::{Collection, ErrorKind, Query};

fn review_doc(id: &str, food_id: &str, rating: f64) -> Value {
    json!({
        "$id": id,
        "foodId": food_id,
        "username": "tester",
        "review": "fine",
        "rating": rating,
    })
}

fn food_doc(id: &str, name: &str) -> Value {
    json!({
        "$id": id,
        "name": name,
        "imageUrl": "https://img.example/x.png",
        "description": "desc",
    })
}

#[tokio::test]
async fn computes_top_pick_and_leaderboard() {
    let store = MemoryStore::new();
    store.insert(Collection::Review, review_doc("r1", "A", 5.0));
    store.insert(Collection::Review, review_doc("r2", "A", 3.0));
    store.insert(Collection::Review, review_doc("r3", "B", 4.0));
    store.insert(Collection::Food, food_doc("A", "Ramen"));
    store.insert(Collection::Food, food_doc("B", "Burger"));

    let home = load_home_stats(&store).await.unwrap();

    let top = home.top_pick.unwrap();
    assert_eq!(top.food.id, "A");
    assert_eq!(top.stats.count, 2);
    assert_eq!(top.stats.avg, 4.0);

    let ids: Vec<&str> = home
        .leaderboard
        .iter()
        .map(|entry| entry.food.id.as_str())
        .collect();
    assert_eq!(ids, ["A", "B"]);
}

#[tokio::test]
async fn top_pick_falls_back_when_no_food_has_two_reviews() {
    let store = MemoryStore::new();
    store.insert(Collection::Review, review_doc("r1", "A", 2.0));
    store.insert(Collection::Review, review_doc("r2", "B", 5.0));
    store.insert(Collection::Food, food_doc("A", "Ramen"));
    store.insert(Collection::Food, food_doc("B", "Burger"));

    let home = load_home_stats(&store).await.unwrap();
    // Counts tie at 1, so the better average wins the fallback.
    assert_eq!(home.top_pick.unwrap().food.id, "B");
}

#[tokio::test]
async fn reviews_without_food_id_are_skipped() {
    let store = MemoryStore::new();
    store.insert(
        Collection::Review,
        json!({"$id": "r1", "username": "tester", "review": "orphan", "rating": 5.0}),
    );
    store.insert(Collection::Review, review_doc("r2", "A", 3.0));
    store.insert(Collection::Food, food_doc("A", "Ramen"));

    let home = load_home_stats(&store).await.unwrap();
    assert_eq!(home.leaderboard.len(), 1);
    assert_eq!(home.leaderboard[0].food.id, "A");
}

#[tokio::test]
async fn pagination_stops_at_first_short_page() {
    let store = MemoryStore::new();
    for i in 0..250 {
        store.insert(
            Collection::Review,
            review_doc(&format!("r{i:04}"), "A", 4.0),
        );
    }
    store.insert(Collection::Food, food_doc("A", "Ramen"));

    let home = load_home_stats(&store).await.unwrap();
    assert_eq!(home.top_pick.unwrap().stats.count, 250);

    let review_lists = store.list_calls(Collection::Review);
    assert_eq!(review_lists.len(), 3);
    // First page has no cursor; later pages carry the last-seen id.
    assert!(!review_lists[0]
        .iter()
        .any(|q| matches!(q, Query::CursorAfter(_))));
    assert!(review_lists[1].contains(&Query::CursorAfter("r0099".to_string())));
    assert!(review_lists[2].contains(&Query::CursorAfter("r0199".to_string())));
    for queries in &review_lists {
        assert!(queries.contains(&Query::Limit(PAGE_SIZE)));
        assert!(queries.contains(&Query::OrderAsc("$id".to_string())));
    }
}

#[tokio::test]
async fn cursor_advances_past_malformed_trailing_documents() {
    let store = MemoryStore::new();
    for i in 0..99 {
        store.insert(
            Collection::Review,
            review_doc(&format!("r{i:04}"), "A", 4.0),
        );
    }
    // Last document of the full first page fails to parse as a review but
    // still carries an id; the cursor must move past it, not regress.
    store.insert(
        Collection::Review,
        json!({"$id": "r0099", "foodId": "A", "rating": "broken"}),
    );
    for i in 100..105 {
        store.insert(
            Collection::Review,
            review_doc(&format!("r{i:04}"), "A", 4.0),
        );
    }
    store.insert(Collection::Food, food_doc("A", "Ramen"));

    let home = load_home_stats(&store).await.unwrap();
    assert_eq!(home.top_pick.unwrap().stats.count, 104);

    let review_lists = store.list_calls(Collection::Review);
    assert_eq!(review_lists.len(), 2);
    assert!(review_lists[1].contains(&Query::CursorAfter("r0099".to_string())));
}

#[tokio::test]
async fn pagination_caps_at_one_thousand_reviews() {
    let store = MemoryStore::new();
    for i in 0..1005 {
        store.insert(
            Collection::Review,
            review_doc(&format!("r{i:04}"), "A", 4.0),
        );
    }
    store.insert(Collection::Food, food_doc("A", "Ramen"));

    let home = load_home_stats(&store).await.unwrap();
    // Statistics become approximate past the cap.
    assert_eq!(home.top_pick.unwrap().stats.count, 1000);
    assert_eq!(
        store.list_calls(Collection::Review).len(),
        MAX_PAGES
    );
}

#[tokio::test]
async fn leaderboard_is_capped_at_five() {
    let store = MemoryStore::new();
    for i in 0..7 {
        let food_id = format!("F{i}");
        store.insert(
            Collection::Review,
            review_doc(&format!("r{i}"), &food_id, 3.0),
        );
        store.insert(Collection::Food, food_doc(&food_id, &format!("Food {i}")));
    }

    let home = load_home_stats(&store).await.unwrap();
    assert_eq!(home.leaderboard.len(), LEADERBOARD_SIZE);
}

#[tokio::test]
async fn missing_foods_are_dropped_silently() {
    let store = MemoryStore::new();
    store.insert(Collection::Review, review_doc("r1", "A", 5.0));
    store.insert(Collection::Review, review_doc("r2", "A", 3.0));
    store.insert(Collection::Review, review_doc("r3", "B", 4.0));
    // Only B resolves; A's food document was deleted.
    store.insert(Collection::Food, food_doc("B", "Burger"));

    let home = load_home_stats(&store).await.unwrap();
    assert!(home.top_pick.is_none());
    let ids: Vec<&str> = home
        .leaderboard
        .iter()
        .map(|entry| entry.food.id.as_str())
        .collect();
    assert_eq!(ids, ["B"]);
}

#[tokio::test]
async fn rejected_batch_lookup_falls_back_to_per_id_fetches() {
    let store = MemoryStore::new();
    store.insert(Collection::Review, review_doc("r1", "A", 5.0));
    store.insert(Collection::Review, review_doc("r2", "A", 3.0));
    store.insert(Collection::Review, review_doc("r3", "B", 4.0));
    store.insert(Collection::Food, food_doc("A", "Ramen"));
    store.insert(Collection::Food, food_doc("B", "Burger"));
    store.fail_equal_any_with("Query method not supported: equal on $id");

    let home = load_home_stats(&store).await.unwrap();
    assert_eq!(home.top_pick.unwrap().food.id, "A");
    assert_eq!(home.leaderboard.len(), 2);

    let gets: Vec<String> = store
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Get {
                collection: Collection::Food,
                id,
            } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(gets, ["A", "B"]);
}

#[tokio::test]
async fn per_id_fallback_drops_not_found_foods() {
    let store = MemoryStore::new();
    store.insert(Collection::Review, review_doc("r1", "A", 5.0));
    store.insert(Collection::Review, review_doc("r2", "A", 3.0));
    store.insert(Collection::Review, review_doc("r3", "B", 4.0));
    store.insert(Collection::Food, food_doc("A", "Ramen"));
    store.fail_equal_any_with("Query method not supported: equal on $id");

    let home = load_home_stats(&store).await.unwrap();
    assert_eq!(home.top_pick.unwrap().food.id, "A");
    let ids: Vec<&str> = home
        .leaderboard
        .iter()
        .map(|entry| entry.food.id.as_str())
        .collect();
    assert_eq!(ids, ["A"]);
}

#[tokio::test]
async fn fetch_error_aborts_the_whole_computation() {
    let store = MemoryStore::new();
    store.insert(Collection::Review, review_doc("r1", "A", 5.0));
    store.fail_lists_with("Server Error");

    let err = load_home_stats(&store).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Other);
}

#[tokio::test]
async fn no_reviews_yields_empty_home_stats_without_food_lookups() {
    let store = MemoryStore::new();
    let home = load_home_stats(&store).await.unwrap();
    assert!(home.top_pick.is_none());
    assert!(home.leaderboard.is_empty());
    assert!(store.list_calls(Collection::Food).is_empty());
}
