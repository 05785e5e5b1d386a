//! Document Store abstraction. All persistence and querying is delegated to
//! a backend-as-a-service; the rest of the crate only ever talks to this
//! trait, so the aggregation and search logic is testable without a live
//! backend.

pub mod appwrite;
pub mod memory;

use serde_json::{json, Value};
use thiserror::Error;

/// The two logical collections this client uses. Implementations map these
/// to whatever the backend instance calls them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Food,
    Review,
}

/// A single filter in a `list_documents` request.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Equality on a field.
    Equal(String, String),
    /// Equality of the field against any value in the set.
    EqualAny(String, Vec<String>),
    /// Page size.
    Limit(usize),
    /// Cursor pagination: only documents after the one with this id.
    CursorAfter(String),
    /// Ascending order by a field (including the `$id` identifier field).
    OrderAsc(String),
    /// Full-text search on a field. Requires a fulltext index backend-side.
    Search(String, String),
}

impl Query {
    /// Appwrite wire encoding: one JSON object per query, passed as a
    /// `queries[]` parameter.
    pub fn to_wire(&self) -> Value {
        match self {
            Query::Equal(attribute, value) => {
                json!({"method": "equal", "attribute": attribute, "values": [value]})
            }
            Query::EqualAny(attribute, values) => {
                json!({"method": "equal", "attribute": attribute, "values": values})
            }
            Query::Limit(limit) => json!({"method": "limit", "values": [limit]}),
            Query::CursorAfter(id) => json!({"method": "cursorAfter", "values": [id]}),
            Query::OrderAsc(attribute) => json!({"method": "orderAsc", "attribute": attribute}),
            Query::Search(attribute, term) => {
                json!({"method": "search", "attribute": attribute, "values": [term]})
            }
        }
    }
}

/// What a backend failure means to the application, classified once at the
/// store boundary so core logic never has to sniff message text itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The review collection is missing the `foodId` attribute; the reviews
    /// feature is unsupported on this backend instance.
    MissingAttribute,
    /// No fulltext index on the searched field; search must fall back to a
    /// bounded scan.
    MissingIndex,
    /// The requested document does not exist.
    NotFound,
    Other,
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StoreError {
    pub kind: ErrorKind,
    pub message: String,
}

impl StoreError {
    /// Classifies a backend error message into a typed kind. The backend
    /// only gives us free text, so the substrings matched here are part of
    /// its observable contract.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        let kind = if lower.contains("attribute not found") && lower.contains("foodid") {
            ErrorKind::MissingAttribute
        } else if lower.contains("fulltext index") {
            ErrorKind::MissingIndex
        } else {
            ErrorKind::Other
        };
        StoreError { kind, message }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        StoreError {
            kind: ErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        StoreError {
            kind: ErrorKind::Other,
            message: message.into(),
        }
    }
}

/// Abstract persistence/query collaborator. Documents travel as raw JSON
/// objects keyed the way the backend keys them (`$id` for the identifier);
/// callers deserialize into their own model types.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Returns an ordered page of documents matching the filters.
    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<Vec<Value>, StoreError>;

    /// Fetches a single document. Fails with `ErrorKind::NotFound` if absent.
    async fn get_document(&self, collection: Collection, id: &str) -> Result<Value, StoreError>;

    /// Creates a document with the given id and fields, returning the
    /// created document.
    async fn create_document(
        &self,
        collection: Collection,
        id: &str,
        fields: &Value,
    ) -> Result<Value, StoreError>;
}
