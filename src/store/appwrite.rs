//! Browser-side Appwrite client. Speaks the REST document API over
//! `gloo-net`, translates backend failures into typed `StoreError`s, and
//! owns the anonymous-session bootstrap.

use gloo_net::http::{Request, RequestBuilder, Response};
use leptos::logging::{log, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use web_sys::RequestCredentials;

use super::{Collection, DocumentStore, Query, StoreError};

/// Compile-time configuration with the same defaults the backend project
/// uses. Override with `FOODRATE_APPWRITE_*` env vars at build time.
#[derive(Debug, Clone)]
pub struct AppwriteConfig {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub food_collection_id: String,
    pub review_collection_id: String,
}

impl AppwriteConfig {
    pub fn from_env() -> Self {
        AppwriteConfig {
            endpoint: option_env!("FOODRATE_APPWRITE_ENDPOINT")
                .unwrap_or("https://cloud.appwrite.io/v1")
                .to_string(),
            project_id: option_env!("FOODRATE_APPWRITE_PROJECT_ID")
                .unwrap_or("")
                .to_string(),
            database_id: option_env!("FOODRATE_APPWRITE_DATABASE_ID")
                .unwrap_or("foodrate")
                .to_string(),
            food_collection_id: option_env!("FOODRATE_APPWRITE_FOOD_COLLECTION_ID")
                .unwrap_or("food")
                .to_string(),
            review_collection_id: option_env!("FOODRATE_APPWRITE_REVIEW_COLLECTION_ID")
                .unwrap_or("review")
                .to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppwriteStore {
    config: AppwriteConfig,
}

#[derive(Deserialize)]
struct DocumentList {
    documents: Vec<Value>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl AppwriteStore {
    pub fn new(config: AppwriteConfig) -> Self {
        AppwriteStore { config }
    }

    fn collection_id(&self, collection: Collection) -> &str {
        match collection {
            Collection::Food => &self.config.food_collection_id,
            Collection::Review => &self.config.review_collection_id,
        }
    }

    fn documents_url(&self, collection: Collection) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint,
            self.config.database_id,
            self.collection_id(collection)
        )
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("X-Appwrite-Project", &self.config.project_id)
            .credentials(RequestCredentials::Include)
    }

    async fn error_from(response: Response) -> StoreError {
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => format!("request failed with status {status}"),
        };
        if status == 404 {
            StoreError::not_found(message)
        } else {
            StoreError::classify(message)
        }
    }

    /// Ensures an anonymous session exists before any document call.
    /// Idempotent; failures are logged and never fatal.
    pub async fn ensure_anon_session(&self) {
        let account_url = format!("{}/account", self.config.endpoint);
        let logged_in = match self
            .with_headers(Request::get(&account_url))
            .send()
            .await
        {
            Ok(response) => response.ok(),
            Err(_) => false,
        };
        if logged_in {
            return;
        }

        let session_url = format!("{}/account/sessions/anonymous", self.config.endpoint);
        match self.with_headers(Request::post(&session_url)).send().await {
            Ok(response) if response.ok() => log!("[STORE] Anonymous session created"),
            Ok(response) => warn!(
                "[STORE] Failed to create anonymous session: status {}",
                response.status()
            ),
            Err(err) => warn!("[STORE] Failed to create anonymous session: {err}"),
        }
    }
}

impl DocumentStore for AppwriteStore {
    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<Vec<Value>, StoreError> {
        let mut url = self.documents_url(collection);
        let mut separator = '?';
        for query in queries {
            url.push(separator);
            url.push_str("queries[]=");
            url.push_str(&urlencoding::encode(&query.to_wire().to_string()));
            separator = '&';
        }

        let response = self
            .with_headers(Request::get(&url))
            .send()
            .await
            .map_err(|err| StoreError::other(err.to_string()))?;
        if !response.ok() {
            return Err(Self::error_from(response).await);
        }
        let list: DocumentList = response
            .json()
            .await
            .map_err(|err| StoreError::other(err.to_string()))?;
        Ok(list.documents)
    }

    async fn get_document(&self, collection: Collection, id: &str) -> Result<Value, StoreError> {
        let url = format!(
            "{}/{}",
            self.documents_url(collection),
            urlencoding::encode(id)
        );
        let response = self
            .with_headers(Request::get(&url))
            .send()
            .await
            .map_err(|err| StoreError::other(err.to_string()))?;
        if !response.ok() {
            return Err(Self::error_from(response).await);
        }
        response
            .json()
            .await
            .map_err(|err| StoreError::other(err.to_string()))
    }

    async fn create_document(
        &self,
        collection: Collection,
        id: &str,
        fields: &Value,
    ) -> Result<Value, StoreError> {
        let url = self.documents_url(collection);
        let body = json!({ "documentId": id, "data": fields });
        let response = self
            .with_headers(Request::post(&url))
            .json(&body)
            .map_err(|err| StoreError::other(err.to_string()))?
            .send()
            .await
            .map_err(|err| StoreError::other(err.to_string()))?;
        if !response.ok() {
            return Err(Self::error_from(response).await);
        }
        response
            .json()
            .await
            .map_err(|err| StoreError::other(err.to_string()))
    }
}
