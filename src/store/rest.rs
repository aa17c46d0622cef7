//! Hosted backend client
//!
//! HTTP client for the hosted database's PostgREST-style REST interface
//! (`/rest/v1/<table>`). One request per call; failures are returned to the
//! caller as-is.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;

use super::{check_patch, Query, Row, Store, StoreError, StoreResult, Table};

/// Configuration for the hosted backend client
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Project URL (e.g., "https://xyz.example.co")
    pub base_url: String,
    /// Public API key, sent as `apikey` and bearer token
    pub api_key: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for RestStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

pub struct RestStore {
    client: Client,
    config: RestStoreConfig,
}

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: Option<String>,
    details: Option<String>,
}

impl RestStore {
    pub fn new(config: RestStoreConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RestStoreConfig {
        &self.config
    }

    fn table_url(&self, table: Table) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            table.as_str()
        )
    }

    fn row_url(&self, table: Table, id: &str) -> String {
        format!(
            "{}?id=eq.{}",
            self.table_url(table),
            urlencoding::encode(id)
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn send(&self, builder: RequestBuilder) -> StoreResult<Response> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(StoreError::from_transport)?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<BackendErrorBody>(&text) {
            Ok(BackendErrorBody {
                message: Some(message),
                details,
            }) => match details {
                Some(details) => format!("{} ({})", message, details),
                None => message,
            },
            _ => text,
        };

        Err(StoreError::Backend { status, message })
    }

    async fn representation(response: Response) -> StoreResult<Vec<Row>> {
        response.json::<Vec<Row>>().await.map_err(StoreError::from_transport)
    }
}

#[async_trait]
impl Store for RestStore {
    async fn select(&self, table: Table, query: &Query) -> StoreResult<Vec<Row>> {
        let url = format!("{}?{}", self.table_url(table), query.to_query_string());
        tracing::debug!(table = %table, "select");

        let response = self.send(self.client.get(&url)).await?;
        Self::representation(response).await
    }

    async fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&row);

        let response = self.send(request).await?;
        Self::representation(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Serialization("insert returned no row".to_string()))
    }

    async fn update(&self, table: Table, id: &str, patch: Row) -> StoreResult<Row> {
        check_patch(&patch)?;

        let request = self
            .client
            .patch(self.row_url(table, id))
            .header("Prefer", "return=representation")
            .json(&patch);

        let response = self.send(request).await?;
        Self::representation(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(table.as_str(), id))
    }

    async fn delete(&self, table: Table, id: &str) -> StoreResult<()> {
        let request = self
            .client
            .delete(self.row_url(table, id))
            .header("Prefer", "return=representation");

        let response = self.send(request).await?;
        if Self::representation(response).await?.is_empty() {
            return Err(StoreError::not_found(table.as_str(), id));
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        let url = format!("{}/rest/v1/", self.config.base_url.trim_end_matches('/'));
        self.send(self.client.get(&url)).await.map(|_| ())
    }

    fn kind(&self) -> &'static str {
        "rest"
    }
}
