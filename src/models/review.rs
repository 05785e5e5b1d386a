use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const MAX_REVIEW_LEN: usize = 500;

/// A star rating with text, as stored in the backend's `review` collection.
/// `food_id` is a plain foreign key; legacy documents without one
/// deserialize with an empty string and are skipped by aggregation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Review {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "foodId", default)]
    pub food_id: String,
    #[serde(rename = "username", default)]
    pub author: String,
    #[serde(rename = "review", default)]
    pub text: String,
    #[serde(default)]
    pub rating: f64,
}

/// Form input for the review form on the food page.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub food_id: String,
    pub author: String,
    pub text: String,
    pub rating: u8,
}

impl NewReview {
    pub fn is_valid(&self) -> bool {
        !self.author.trim().is_empty()
            && !self.text.trim().is_empty()
            && self.text.chars().count() <= MAX_REVIEW_LEN
            && self.rating <= 5
    }

    /// Document payload for `create_document`, trimmed.
    pub fn fields(&self) -> Value {
        json!({
            "foodId": self.food_id,
            "username": self.author.trim(),
            "review": self.text.trim(),
            "rating": self.rating,
        })
    }
}
