//! In-memory Document Store with a call log. Backs the test suite so the
//! aggregation and search logic can be exercised without a live backend.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use super::{Collection, DocumentStore, Query, StoreError};

/// One recorded store operation, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List {
        collection: Collection,
        queries: Vec<Query>,
    },
    Get {
        collection: Collection,
        id: String,
    },
    Create {
        collection: Collection,
        id: String,
    },
}

#[derive(Default)]
struct Inner {
    documents: HashMap<Collection, Vec<Value>>,
    calls: Vec<Call>,
    search_error: Option<String>,
    equal_any_error: Option<String>,
    list_error: Option<String>,
}

/// Documents are kept in insertion order; that order is the backend's
/// "default order" for unordered list queries.
#[derive(Default)]
pub struct MemoryStore {
    inner: RefCell<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn insert(&self, collection: Collection, doc: Value) {
        self.inner
            .borrow_mut()
            .documents
            .entry(collection)
            .or_default()
            .push(doc);
    }

    /// Every list query containing a `Search` filter fails with this message.
    pub fn fail_search_with(&self, message: &str) {
        self.inner.borrow_mut().search_error = Some(message.to_string());
    }

    /// Every list query containing an `EqualAny` filter fails with this
    /// message (exercises the per-id fallback fetch).
    pub fn fail_equal_any_with(&self, message: &str) {
        self.inner.borrow_mut().equal_any_error = Some(message.to_string());
    }

    /// Every list query fails with this message.
    pub fn fail_lists_with(&self, message: &str) {
        self.inner.borrow_mut().list_error = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    /// The queries of each recorded `List` call against the collection.
    pub fn list_calls(&self, collection: Collection) -> Vec<Vec<Query>> {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::List {
                    collection: c,
                    queries,
                } if *c == collection => Some(queries.clone()),
                _ => None,
            })
            .collect()
    }
}

fn field_str<'a>(doc: &'a Value, attribute: &str) -> Option<&'a str> {
    doc.get(attribute).and_then(Value::as_str)
}

impl DocumentStore for MemoryStore {
    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<Vec<Value>, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Call::List {
            collection,
            queries: queries.to_vec(),
        });

        if let Some(message) = &inner.list_error {
            return Err(StoreError::classify(message.clone()));
        }
        if queries.iter().any(|q| matches!(q, Query::Search(..))) {
            if let Some(message) = &inner.search_error {
                return Err(StoreError::classify(message.clone()));
            }
        }
        if queries.iter().any(|q| matches!(q, Query::EqualAny(..))) {
            if let Some(message) = &inner.equal_any_error {
                return Err(StoreError::classify(message.clone()));
            }
        }

        let mut docs: Vec<Value> = inner
            .documents
            .get(&collection)
            .cloned()
            .unwrap_or_default();
        let mut limit = None;
        let mut cursor = None;
        for query in queries {
            match query {
                Query::Equal(attribute, value) => {
                    docs.retain(|doc| field_str(doc, attribute) == Some(value.as_str()));
                }
                Query::EqualAny(attribute, values) => {
                    docs.retain(|doc| {
                        field_str(doc, attribute)
                            .map_or(false, |v| values.iter().any(|value| value == v))
                    });
                }
                Query::Search(attribute, term) => {
                    let needle = term.to_lowercase();
                    docs.retain(|doc| {
                        field_str(doc, attribute)
                            .map_or(false, |v| v.to_lowercase().contains(&needle))
                    });
                }
                Query::OrderAsc(attribute) => {
                    docs.sort_by(|a, b| {
                        field_str(a, attribute)
                            .unwrap_or_default()
                            .cmp(field_str(b, attribute).unwrap_or_default())
                    });
                }
                Query::Limit(n) => limit = Some(*n),
                Query::CursorAfter(id) => cursor = Some(id.clone()),
            }
        }

        if let Some(cursor) = cursor {
            match docs
                .iter()
                .position(|doc| field_str(doc, "$id") == Some(cursor.as_str()))
            {
                Some(position) => {
                    docs.drain(..=position);
                }
                None => docs.clear(),
            }
        }
        if let Some(n) = limit {
            docs.truncate(n);
        }
        Ok(docs)
    }

    async fn get_document(&self, collection: Collection, id: &str) -> Result<Value, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Call::Get {
            collection,
            id: id.to_string(),
        });
        inner
            .documents
            .get(&collection)
            .and_then(|docs| {
                docs.iter()
                    .find(|doc| field_str(doc, "$id") == Some(id))
                    .cloned()
            })
            .ok_or_else(|| {
                StoreError::not_found("Document with the requested ID could not be found.")
            })
    }

    async fn create_document(
        &self,
        collection: Collection,
        id: &str,
        fields: &Value,
    ) -> Result<Value, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Call::Create {
            collection,
            id: id.to_string(),
        });
        let mut doc = fields.clone();
        match doc.as_object_mut() {
            Some(object) => {
                object.insert("$id".to_string(), Value::String(id.to_string()));
            }
            None => return Err(StoreError::other("document fields must be an object")),
        }
        inner
            .documents
            .entry(collection)
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }
}
