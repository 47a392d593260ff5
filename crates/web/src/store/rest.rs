//! PostgREST client for the hosted store.
//!
//! # API Reference
//!
//! - Base URL: `{SUPABASE_URL}/rest/v1/{table}`
//! - Authentication: `apikey: <anon key>` and `Authorization: Bearer <anon key>`
//! - Filters: `column=eq.value`, ordering: `order=column.asc|desc`
//! - Upsert: `POST` with `Prefer: resolution=merge-duplicates`

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use url::Url;

use super::{Query, Row, StoreError, scalar_text};
use crate::config::SupabaseConfig;

/// Path prefix of the REST interface.
const REST_PATH: &str = "rest/v1/";

/// `Prefer` header for plain inserts and updates.
const PREFER_MINIMAL: &str = "return=minimal";

/// `Prefer` header for upserts.
const PREFER_MERGE: &str = "resolution=merge-duplicates,return=minimal";

/// HTTP client for the hosted store.
#[derive(Clone)]
pub struct RestStore {
    inner: Arc<RestStoreInner>,
}

struct RestStoreInner {
    client: reqwest::Client,
    base_url: Url,
}

impl RestStore {
    /// Create a new client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        let key = config.anon_key.expose_secret();
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| StoreError::Config(format!("Invalid API key format: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| StoreError::Config(format!("Invalid API key format: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(RestStoreInner {
                client,
                base_url: config.url.clone(),
            }),
        })
    }

    /// `GET` the rows matching `query`.
    pub(crate) async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let url = self.query_url(query, true)?;
        let response = self.inner.client.get(url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// `POST` new rows.
    pub(crate) async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<(), StoreError> {
        let url = self.table_url(table)?;
        let response = self
            .inner
            .client
            .post(url)
            .header("Prefer", PREFER_MINIMAL)
            .json(&rows)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// `POST` rows, merging on primary key.
    pub(crate) async fn upsert(&self, table: &str, rows: Vec<Row>) -> Result<(), StoreError> {
        let url = self.table_url(table)?;
        let response = self
            .inner
            .client
            .post(url)
            .header("Prefer", PREFER_MERGE)
            .json(&rows)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// `PATCH` the matching rows.
    pub(crate) async fn update(&self, query: &Query, patch: Row) -> Result<(), StoreError> {
        let url = self.query_url(query, false)?;
        let response = self
            .inner
            .client
            .patch(url)
            .header("Prefer", PREFER_MINIMAL)
            .json(&patch)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// `DELETE` the matching rows.
    pub(crate) async fn delete(&self, query: &Query) -> Result<(), StoreError> {
        let url = self.query_url(query, false)?;
        let response = self.inner.client.delete(url).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// URL of a table endpoint.
    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        self.inner
            .base_url
            .join(&format!("{REST_PATH}{table}"))
            .map_err(|e| StoreError::Config(format!("Invalid table URL: {e}")))
    }

    /// URL of a table endpoint with filters and ordering encoded as query parameters.
    fn query_url(&self, query: &Query, with_select: bool) -> Result<Url, StoreError> {
        let mut url = self.table_url(query.table_name())?;
        {
            let mut pairs = url.query_pairs_mut();
            if with_select {
                pairs.append_pair("select", "*");
            }
            for (column, value) in query.filters() {
                let text = scalar_text(value).ok_or_else(|| {
                    StoreError::Config(format!("Unsupported filter value for {column}"))
                })?;
                pairs.append_pair(column, &format!("eq.{text}"));
            }
            if let Some((column, order)) = query.ordering() {
                pairs.append_pair("order", &format!("{column}.{}", order.as_str()));
            }
        }
        Ok(url)
    }
}

/// Turn a non-2xx response into [`StoreError`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    if status == reqwest::StatusCode::CONFLICT {
        return Err(StoreError::Conflict(message));
    }

    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
