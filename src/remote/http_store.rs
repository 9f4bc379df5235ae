//! HTTP Store
//!
//! `RemoteStore` over a Backend-Services style REST API:
//! - `GET    {base}/{collection}` with an `X-Everlive-Sort` header
//! - `POST   {base}/{collection}`
//! - `PUT    {base}/{collection}/{id}`
//! - `PUT    {base}/{collection}` with an `X-Everlive-Filter` header
//!
//! Every response wraps its payload in `{"Result": ...}`.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::query::{Filter, FlagPatch, SortDirection, SortField, SortSpec};
use super::traits::RemoteStore;
use crate::config::GroceryConfig;
use crate::domain::{DomainError, DomainResult, GroceryItem, GroceryRecord, NewGrocery};

const SORT_HEADER: &str = "X-Everlive-Sort";
const FILTER_HEADER: &str = "X-Everlive-Filter";

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(rename = "Result")]
    result: T,
}

#[derive(Deserialize)]
struct Created {
    #[serde(rename = "Id")]
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RecordUpdate<'a> {
    name: &'a str,
    done: bool,
    deleted: bool,
}

pub struct HttpStore {
    client: Client,
    base_url: String,
    collection: String,
    token: Option<String>,
}

impl HttpStore {
    pub fn new(base_url: &str, collection: &str, token: Option<String>) -> DomainResult<Self> {
        Self::with_timeout(base_url, collection, token, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: &str,
        collection: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> DomainResult<Self> {
        if base_url.trim().is_empty() {
            return Err(DomainError::InvalidInput("backend url is empty".to_string()));
        }
        if timeout.is_zero() {
            return Err(DomainError::InvalidInput("request timeout must be positive".to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_config(config: &GroceryConfig) -> DomainResult<Self> {
        Self::with_timeout(
            &config.backend_url,
            &config.collection,
            Some(config.token.clone()),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.collection)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }
}

/// `{"ModifiedAt": -1}`
fn sort_header(sort: &SortSpec) -> String {
    let field = match sort.field {
        SortField::ModifiedAt => "ModifiedAt",
        SortField::Name => "Name",
    };
    let direction = match sort.direction {
        SortDirection::Ascending => 1,
        SortDirection::Descending => -1,
    };
    let mut header = serde_json::Map::new();
    header.insert(field.to_string(), json!(direction));
    Value::Object(header).to_string()
}

/// `{"Id": {"$in": [...]}}`
fn filter_header(filter: &Filter) -> String {
    match filter {
        Filter::IdIn(ids) => json!({ "Id": { "$in": ids } }).to_string(),
    }
}

/// Unwrap the `Result` envelope, mapping HTTP failures onto domain errors
async fn read_result<T: DeserializeOwned>(response: Response) -> DomainResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status, &body));
    }

    let envelope: Envelope<T> = response
        .json()
        .await
        .map_err(|e| DomainError::Transport(format!("malformed response: {}", e)))?;
    Ok(envelope.result)
}

fn status_error(status: StatusCode, body: &str) -> DomainError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string());

    match status {
        StatusCode::NOT_FOUND => DomainError::NotFound(message),
        StatusCode::CONFLICT => DomainError::Conflict(message),
        StatusCode::BAD_REQUEST => DomainError::InvalidInput(message),
        _ => DomainError::Transport(format!("HTTP {}: {}", status.as_u16(), message)),
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    /// The REST backend has no client-side replication
    fn is_synchronizing(&self) -> bool {
        false
    }

    async fn sync_finished(&self) -> DomainResult<()> {
        Ok(())
    }

    async fn fetch_all(&self, sort: &SortSpec) -> DomainResult<Vec<GroceryRecord>> {
        let response = self
            .request(Method::GET, self.collection_url())
            .header(SORT_HEADER, sort_header(sort))
            .send()
            .await?;
        read_result(response).await
    }

    async fn create(&self, grocery: &NewGrocery) -> DomainResult<String> {
        let response = self
            .request(Method::POST, self.collection_url())
            .json(grocery)
            .send()
            .await?;
        let created: Created = read_result(response).await?;
        Ok(created.id)
    }

    async fn update_one(&self, item: &GroceryItem) -> DomainResult<()> {
        if item.id.is_empty() {
            return Err(DomainError::InvalidInput("grocery has no remote id".to_string()));
        }

        let body = RecordUpdate {
            name: &item.name,
            done: item.done,
            deleted: item.deleted,
        };
        let response = self
            .request(Method::PUT, self.item_url(&item.id))
            .json(&body)
            .send()
            .await?;
        let _: Value = read_result(response).await?;
        Ok(())
    }

    async fn update_many(&self, filter: &Filter, patch: &FlagPatch) -> DomainResult<u64> {
        let response = self
            .request(Method::PUT, self.collection_url())
            .header(FILTER_HEADER, filter_header(filter))
            .json(patch)
            .send()
            .await?;
        read_result(response).await
    }
}
