use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const MAX_NAME_LEN: usize = 30;
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// A food entry as stored in the backend's `food` collection.
/// Immutable after creation from this client's point of view.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Food {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub description: String,
}

impl Food {
    /// Parses a page of raw documents, dropping anything that does not
    /// deserialize as a food.
    pub fn from_docs(docs: Vec<Value>) -> Vec<Food> {
        docs.into_iter()
            .filter_map(|doc| serde_json::from_value(doc).ok())
            .collect()
    }
}

/// Form input for the food-creation page. Validated client-side before any
/// network call is made.
#[derive(Debug, Clone, Default)]
pub struct NewFood {
    pub name: String,
    pub image_url: String,
    pub description: String,
}

impl NewFood {
    pub fn is_valid(&self) -> bool {
        let name = self.name.trim();
        let description = self.description.trim();
        // Limits count characters, not bytes, so multibyte names fit.
        !name.is_empty()
            && name.chars().count() <= MAX_NAME_LEN
            && !description.is_empty()
            && description.chars().count() <= MAX_DESCRIPTION_LEN
            && has_image_scheme(self.image_url.trim())
    }

    /// Document payload for `create_document`, trimmed.
    pub fn fields(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "imageUrl": self.image_url.trim(),
            "description": self.description.trim(),
        })
    }
}

fn has_image_scheme(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
