//! Review aggregation and ranking for the landing page: fetches the full
//! review set via cursor pagination, folds it into per-food statistics, and
//! selects the top pick and the leaderboard with deterministic tie-breaks.

use std::cmp::Ordering;
use std::collections::HashMap;

use futures::future;
use leptos::logging::warn;
use serde_json::Value;

use crate::models::food::Food;
use crate::models::review::Review;
use crate::store::{Collection, DocumentStore, ErrorKind, Query, StoreError};

pub const PAGE_SIZE: usize = 100;
pub const MAX_PAGES: usize = 10;
pub const LEADERBOARD_SIZE: usize = 5;

/// Minimum sample size before an average is allowed to win the top pick,
/// so a single-review outlier cannot dominate.
const MIN_TOP_PICK_REVIEWS: u32 = 2;

/// Per-food statistics derived from the reviews observed in the current
/// fetch window. Never persisted; recomputed on every load.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodStats {
    pub food_id: String,
    pub count: u32,
    pub sum: f64,
    pub avg: f64,
}

impl FoodStats {
    /// Average rounded to one decimal for display.
    pub fn rounded_avg(&self) -> f64 {
        (self.avg * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedFood {
    pub food: Food,
    pub stats: FoodStats,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeStats {
    pub top_pick: Option<RankedFood>,
    pub leaderboard: Vec<RankedFood>,
}

/// One-pass fold of reviews into per-food stats. Reviews without a foodId
/// are orphaned legacy data and are skipped, not an error.
pub fn aggregate(reviews: &[Review]) -> Vec<FoodStats> {
    let mut by_food: HashMap<&str, FoodStats> = HashMap::new();
    for review in reviews {
        if review.food_id.is_empty() {
            continue;
        }
        let entry = by_food
            .entry(&review.food_id)
            .or_insert_with(|| FoodStats {
                food_id: review.food_id.clone(),
                count: 0,
                sum: 0.0,
                avg: 0.0,
            });
        entry.count += 1;
        entry.sum += review.rating;
    }
    let mut stats: Vec<FoodStats> = by_food.into_values().collect();
    for entry in &mut stats {
        entry.avg = if entry.count > 0 {
            entry.sum / entry.count as f64
        } else {
            0.0
        };
    }
    stats
}

fn by_avg_then_count(a: &FoodStats, b: &FoodStats) -> Ordering {
    b.avg
        .partial_cmp(&a.avg)
        .unwrap_or(Ordering::Equal)
        .then(b.count.cmp(&a.count))
        .then_with(|| a.food_id.cmp(&b.food_id))
}

fn by_count_then_avg(a: &FoodStats, b: &FoodStats) -> Ordering {
    b.count
        .cmp(&a.count)
        .then(b.avg.partial_cmp(&a.avg).unwrap_or(Ordering::Equal))
        .then_with(|| a.food_id.cmp(&b.food_id))
}

/// Best average among foods with at least two reviews; falls back to the
/// most-reviewed food when nothing meets the gate. The foodId tie-break
/// makes the result independent of fetch order.
pub fn top_pick(stats: &[FoodStats]) -> Option<FoodStats> {
    let mut candidates: Vec<FoodStats> = stats
        .iter()
        .filter(|entry| entry.count >= MIN_TOP_PICK_REVIEWS)
        .cloned()
        .collect();
    candidates.sort_by(by_avg_then_count);
    if let Some(best) = candidates.into_iter().next() {
        return Some(best);
    }

    let mut all: Vec<FoodStats> = stats.to_vec();
    all.sort_by(by_count_then_avg);
    all.into_iter().next()
}

/// Top 5 foods by review count, tie-broken by average then foodId.
pub fn leaderboard(stats: &[FoodStats]) -> Vec<FoodStats> {
    let mut all: Vec<FoodStats> = stats.to_vec();
    all.sort_by(by_count_then_avg);
    all.truncate(LEADERBOARD_SIZE);
    all
}

/// Fetches reviews in pages of `PAGE_SIZE` ordered ascending by `$id`,
/// stopping at the first short page or after `MAX_PAGES` pages, whichever
/// comes first. Past that cap the statistics are approximate by design.
async fn fetch_all_reviews<S: DocumentStore>(store: &S) -> Result<Vec<Review>, StoreError> {
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;
    for _ in 0..MAX_PAGES {
        let mut queries = vec![Query::Limit(PAGE_SIZE), Query::OrderAsc("$id".to_string())];
        if let Some(cursor) = &cursor {
            queries.push(Query::CursorAfter(cursor.clone()));
        }
        let docs = store.list_documents(Collection::Review, &queries).await?;
        let fetched = docs.len();
        // Advance from the raw page, not the parsed reviews: a trailing
        // document that fails to deserialize must still move the cursor.
        let last_id = docs
            .last()
            .and_then(|doc| doc.get("$id"))
            .and_then(Value::as_str)
            .map(str::to_string);
        all.extend(
            docs.into_iter()
                .filter_map(|doc| serde_json::from_value::<Review>(doc).ok()),
        );
        if fetched < PAGE_SIZE {
            break;
        }
        match last_id {
            Some(id) => cursor = Some(id),
            None => break,
        }
    }
    Ok(all)
}

/// Resolves the foods behind a set of ids into a lookup map. Tries a batch
/// query against the identifier field first; if the backend rejects it,
/// issues one lookup per id concurrently and merges by id. A NotFound on the
/// per-id path is an absent entry, not a failure.
async fn resolve_foods<S: DocumentStore>(
    store: &S,
    ids: &[String],
) -> Result<HashMap<String, Food>, StoreError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let batch = [
        Query::EqualAny("$id".to_string(), ids.to_vec()),
        Query::Limit(ids.len().max(1)),
    ];
    match store.list_documents(Collection::Food, &batch).await {
        Ok(docs) => Ok(Food::from_docs(docs)
            .into_iter()
            .map(|food| (food.id.clone(), food))
            .collect()),
        Err(err) => {
            warn!("[HOME] Batch fetch by $id rejected, falling back to per-id fetch: {err}");
            let lookups = ids.iter().map(|id| store.get_document(Collection::Food, id));
            let mut foods = HashMap::new();
            for result in future::join_all(lookups).await {
                match result {
                    Ok(doc) => {
                        if let Ok(food) = serde_json::from_value::<Food>(doc) {
                            foods.insert(food.id.clone(), food);
                        }
                    }
                    Err(err) if err.kind == ErrorKind::NotFound => {}
                    Err(err) => return Err(err),
                }
            }
            Ok(foods)
        }
    }
}

/// Computes the landing-page statistics. Any review-fetch error aborts the
/// whole computation; partial results are never returned. Stats entries
/// whose food no longer exists are silently dropped from both outputs.
pub async fn load_home_stats<S: DocumentStore>(store: &S) -> Result<HomeStats, StoreError> {
    let reviews = fetch_all_reviews(store).await?;
    let stats = aggregate(&reviews);
    let top = top_pick(&stats);
    let board = leaderboard(&stats);

    let mut ids: Vec<String> = Vec::new();
    if let Some(top) = &top {
        ids.push(top.food_id.clone());
    }
    for entry in &board {
        if !ids.contains(&entry.food_id) {
            ids.push(entry.food_id.clone());
        }
    }
    let foods = resolve_foods(store, &ids).await?;

    let top_pick = top.and_then(|stats| {
        foods
            .get(&stats.food_id)
            .cloned()
            .map(|food| RankedFood { food, stats })
    });
    let leaderboard = board
        .into_iter()
        .filter_map(|stats| {
            foods
                .get(&stats.food_id)
                .cloned()
                .map(|food| RankedFood { food, stats })
        })
        .collect();
    Ok(HomeStats {
        top_pick,
        leaderboard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: &str, food_id: &str, rating: f64) -> Review {
        Review {
            id: id.to_string(),
            food_id: food_id.to_string(),
            author: "tester".to_string(),
            text: "fine".to_string(),
            rating,
        }
    }

    fn stats_for<'a>(stats: &'a [FoodStats], food_id: &str) -> &'a FoodStats {
        stats
            .iter()
            .find(|entry| entry.food_id == food_id)
            .expect("missing stats entry")
    }

    #[test]
    fn aggregate_sums_counts_and_averages() {
        let reviews = vec![
            review("r1", "A", 5.0),
            review("r2", "A", 3.0),
            review("r3", "B", 4.0),
        ];
        let stats = aggregate(&reviews);
        assert_eq!(stats.len(), 2);

        let a = stats_for(&stats, "A");
        assert_eq!((a.count, a.sum, a.avg), (2, 8.0, 4.0));
        let b = stats_for(&stats, "B");
        assert_eq!((b.count, b.sum, b.avg), (1, 4.0, 4.0));
    }

    #[test]
    fn aggregate_keeps_sum_and_avg_consistent() {
        let reviews = vec![
            review("r1", "A", 1.5),
            review("r2", "A", 2.5),
            review("r3", "A", 4.0),
            review("r4", "B", 0.0),
        ];
        for entry in aggregate(&reviews) {
            let expected_sum: f64 = reviews
                .iter()
                .filter(|r| r.food_id == entry.food_id)
                .map(|r| r.rating)
                .sum();
            assert_eq!(entry.sum, expected_sum);
            assert_eq!(entry.avg, entry.sum / entry.count as f64);
        }
    }

    #[test]
    fn aggregate_skips_reviews_without_food_id() {
        let reviews = vec![review("r1", "", 5.0), review("r2", "A", 3.0)];
        let stats = aggregate(&reviews);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].food_id, "A");
    }

    #[test]
    fn top_pick_requires_two_reviews() {
        // B has the best average but only one review; A meets the gate.
        let reviews = vec![
            review("r1", "A", 4.0),
            review("r2", "A", 4.0),
            review("r3", "B", 5.0),
        ];
        let stats = aggregate(&reviews);
        assert_eq!(top_pick(&stats).unwrap().food_id, "A");
    }

    #[test]
    fn top_pick_falls_back_to_most_reviewed() {
        let reviews = vec![review("r1", "A", 2.0), review("r2", "B", 5.0)];
        let stats = aggregate(&reviews);
        // Nobody meets the count gate; counts tie at 1, so the better
        // average wins.
        assert_eq!(top_pick(&stats).unwrap().food_id, "B");
    }

    #[test]
    fn top_pick_breaks_full_ties_by_food_id() {
        let reviews = vec![
            review("r1", "B", 4.0),
            review("r2", "B", 4.0),
            review("r3", "A", 4.0),
            review("r4", "A", 4.0),
        ];
        let stats = aggregate(&reviews);
        assert_eq!(top_pick(&stats).unwrap().food_id, "A");
    }

    #[test]
    fn ranking_is_independent_of_input_order() {
        let mut reviews = vec![
            review("r1", "A", 5.0),
            review("r2", "A", 3.0),
            review("r3", "B", 4.0),
            review("r4", "C", 4.0),
            review("r5", "C", 4.0),
        ];
        let stats = aggregate(&reviews);
        let pick = top_pick(&stats).unwrap();
        let board = leaderboard(&stats);

        reviews.reverse();
        let stats = aggregate(&reviews);
        assert_eq!(top_pick(&stats).unwrap(), pick);
        assert_eq!(leaderboard(&stats), board);
    }

    #[test]
    fn leaderboard_orders_by_count_then_avg_then_id() {
        let reviews = vec![
            review("r1", "A", 5.0),
            review("r2", "A", 3.0),
            review("r3", "B", 4.0),
        ];
        let stats = aggregate(&reviews);
        let board = leaderboard(&stats);
        let ids: Vec<&str> = board.iter().map(|entry| entry.food_id.as_str()).collect();
        assert_eq!(ids, ["A", "B"]);
    }

    #[test]
    fn leaderboard_never_exceeds_five_entries() {
        let reviews: Vec<Review> = (0..7)
            .map(|i| review(&format!("r{i}"), &format!("F{i}"), 3.0))
            .collect();
        let stats = aggregate(&reviews);
        let board = leaderboard(&stats);
        assert_eq!(board.len(), LEADERBOARD_SIZE);
        // Counts all tie at 1 with equal averages, so foodId decides.
        let ids: Vec<&str> = board.iter().map(|entry| entry.food_id.as_str()).collect();
        assert_eq!(ids, ["F0", "F1", "F2", "F3", "F4"]);
    }

    #[test]
    fn rounded_avg_rounds_to_one_decimal() {
        let entry = FoodStats {
            food_id: "A".to_string(),
            count: 3,
            sum: 11.0,
            avg: 11.0 / 3.0,
        };
        assert_eq!(entry.rounded_avg(), 3.7);
    }
}
