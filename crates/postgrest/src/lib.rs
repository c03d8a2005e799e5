//! PostgREST table client for Reelhouse
//!
//! A small request builder over the `/rest/v1/{table}` endpoints exposed by
//! the hosted database. It covers what the site and the admin dashboard need:
//!
//! - `select` with `eq` filters, ordering and limits
//! - exact row counts through `Prefer: count=exact`
//! - `insert`, `update` and `delete` scoped by filters

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Error body returned by PostgREST on a rejected request
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PostgrestApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for PostgrestApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("Code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(format!("Message: {}", message));
        }
        if let Some(details) = &self.details {
            parts.push(format!("Details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}", hint));
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Error, Debug)]
pub enum PostgrestError {
    #[error("API error: {details} (Status: {status})")]
    ApiError {
        details: PostgrestApiErrorDetails,
        status: StatusCode,
    },

    #[error("API error (unparsed): {message} (Status: {status})")]
    UnparsedApiError { message: String, status: StatusCode },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl PostgrestError {
    /// The message the database attached to the rejection, falling back to
    /// the full error text when there is none.
    pub fn api_message(&self) -> String {
        match self {
            PostgrestError::ApiError { details, .. } => details
                .message
                .clone()
                .unwrap_or_else(|| details.to_string()),
            PostgrestError::UnparsedApiError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            PostgrestError::ApiError { status, .. }
            | PostgrestError::UnparsedApiError { status, .. } => Some(*status),
            PostgrestError::NetworkError(e) => e.status(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// What a mutation should send back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returning {
    /// The affected rows, as JSON
    Representation,
    /// Nothing; required when the caller may insert but not read the table
    Minimal,
}

impl Returning {
    fn prefer(&self) -> &'static str {
        match self {
            Returning::Representation => "return=representation",
            Returning::Minimal => "return=minimal",
        }
    }
}

/// Request builder for a single table
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    base_url: String,
    table: String,
    http_client: Client,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
    returning: Returning,
}

impl PostgrestClient {
    pub fn new(base_url: &str, api_key: &str, table: &str, http_client: Client) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(api_key) {
            headers.insert("apikey", value);
        }
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.to_string(),
            http_client,
            headers,
            query_params: Vec::new(),
            returning: Returning::Representation,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self, PostgrestError> {
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            PostgrestError::InvalidParameters(format!("Invalid header value: {}", value))
        })?;
        let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
            PostgrestError::InvalidParameters(format!("Invalid header name: {}", key))
        })?;

        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Send requests on behalf of a signed-in user (or the anon key)
    pub fn with_auth(self, token: &str) -> Result<Self, PostgrestError> {
        self.with_header("Authorization", &format!("Bearer {}", token))
    }

    pub fn select(self, columns: &str) -> Self {
        self.set_param("select", columns)
    }

    pub fn eq(mut self, column: &str, value: impl fmt::Display) -> Self {
        self.query_params
            .push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn order(self, column: &str, order: SortOrder) -> Self {
        let value = format!("{}.{}", column, order.as_str());
        self.set_param("order", &value)
    }

    pub fn limit(self, count: usize) -> Self {
        self.set_param("limit", &count.to_string())
    }

    pub fn returning(mut self, returning: Returning) -> Self {
        self.returning = returning;
        self
    }

    fn set_param(mut self, key: &str, value: &str) -> Self {
        self.query_params.retain(|(k, _)| k != key);
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    fn build_url(&self) -> Result<String, PostgrestError> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, self.table))?;

        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url.to_string())
    }

    /// Fetch the matching rows
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, PostgrestError> {
        let url = self.build_url()?;
        log::debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;

        let response = check_status(response).await?;

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| PostgrestError::DeserializationError(e.to_string()))
    }

    /// Fetch at most one matching row
    pub async fn maybe_single<T: DeserializeOwned>(&self) -> Result<Option<T>, PostgrestError> {
        let rows = self.clone().limit(1).execute::<T>().await?;
        Ok(rows.into_iter().next())
    }

    /// Count the matching rows without transferring them
    pub async fn count(&self) -> Result<u64, PostgrestError> {
        let url = self.build_url()?;
        log::debug!("HEAD {}", url);

        let response = self
            .http_client
            .head(&url)
            .headers(self.headers.clone())
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let response = check_status(response).await?;

        let range = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                PostgrestError::DeserializationError("Missing Content-Range header".to_string())
            })?;

        parse_content_range_total(range).ok_or_else(|| {
            PostgrestError::DeserializationError(format!("Invalid Content-Range: {}", range))
        })
    }

    pub async fn insert<T: Serialize>(&self, values: &T) -> Result<Value, PostgrestError> {
        let url = self.build_url()?;
        log::debug!("POST {}", url);

        let request = self.http_client.post(&url).json(values);
        self.send_mutation(request).await
    }

    /// Update the rows matched by the filters
    pub async fn update<T: Serialize>(&self, values: &T) -> Result<Value, PostgrestError> {
        self.require_filter("update")?;
        let url = self.build_url()?;
        log::debug!("PATCH {}", url);

        let request = self.http_client.patch(&url).json(values);
        self.send_mutation(request).await
    }

    /// Delete the rows matched by the filters
    pub async fn delete(&self) -> Result<Value, PostgrestError> {
        self.require_filter("delete")?;
        let url = self.build_url()?;
        log::debug!("DELETE {}", url);

        let request = self.http_client.delete(&url);
        self.send_mutation(request).await
    }

    // An unfiltered PATCH/DELETE touches the whole table.
    fn require_filter(&self, operation: &str) -> Result<(), PostgrestError> {
        let filtered = self
            .query_params
            .iter()
            .any(|(key, value)| !matches!(key.as_str(), "select" | "order" | "limit") && !value.is_empty());
        if filtered {
            Ok(())
        } else {
            Err(PostgrestError::InvalidParameters(format!(
                "{} on {} requires a filter",
                operation, self.table
            )))
        }
    }

    async fn send_mutation(&self, request: RequestBuilder) -> Result<Value, PostgrestError> {
        let response = request
            .headers(self.headers.clone())
            .header("Prefer", self.returning.prefer())
            .send()
            .await?;

        let response = check_status(response).await?;

        let body_text = response.text().await.map_err(|e| {
            PostgrestError::DeserializationError(format!("Failed to read response body: {}", e))
        })?;

        // return=minimal answers 201/204 with an empty body
        if body_text.trim().is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_str::<Value>(&body_text)
                .map_err(|e| PostgrestError::DeserializationError(e.to_string()))
        }
    }
}

async fn check_status(response: Response) -> Result<Response, PostgrestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string());

    match serde_json::from_str::<PostgrestApiErrorDetails>(&error_text) {
        Ok(details) => Err(PostgrestError::ApiError { details, status }),
        Err(_) => Err(PostgrestError::UnparsedApiError {
            message: error_text,
            status,
        }),
    }
}

/// `0-24/3573` and `*/0` both carry the total after the slash
fn parse_content_range_total(range: &str) -> Option<u64> {
    range.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, table: &str) -> PostgrestClient {
        PostgrestClient::new(&server.uri(), "fake-key", table, Client::new())
    }

    #[tokio::test]
    async fn test_select_with_filter_and_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/items"))
            .and(query_param("select", "*"))
            .and(query_param("is_active", "eq.true"))
            .and(query_param("order", "position.asc"))
            .and(header("apikey", "fake-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "name": "First" },
                { "id": 2, "name": "Second" }
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let rows = client(&mock_server, "items")
            .select("*")
            .eq("is_active", true)
            .order("position", SortOrder::Ascending)
            .execute::<Value>()
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "First");
    }

    #[tokio::test]
    async fn test_maybe_single_returns_none_for_no_rows() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/roles"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let row = client(&mock_server, "roles")
            .select("role")
            .eq("user_id", "u1")
            .maybe_single::<Value>()
            .await
            .unwrap();

        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_count_reads_content_range() {
        let mock_server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/rest/v1/items"))
            .and(header("Prefer", "count=exact"))
            .respond_with(ResponseTemplate::new(200).insert_header("Content-Range", "0-6/7"))
            .mount(&mock_server)
            .await;

        let total = client(&mock_server, "items").select("id").count().await.unwrap();
        assert_eq!(total, 7);
    }

    #[tokio::test]
    async fn test_insert_minimal_accepts_empty_body() {
        let mock_server = MockServer::start().await;
        let payload = json!({ "name": "Jane" });

        Mock::given(method("POST"))
            .and(path("/rest/v1/items"))
            .and(header("Prefer", "return=minimal"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client(&mock_server, "items")
            .returning(Returning::Minimal)
            .insert(&payload)
            .await
            .unwrap();

        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_update_surfaces_api_error_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/items"))
            .and(query_param("id", "eq.42"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "42501",
                "message": "new row violates row-level security policy",
                "details": null,
                "hint": null
            })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server, "items")
            .eq("id", 42)
            .update(&json!({ "name": "x" }))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.api_message(), "new row violates row-level security policy");
    }

    #[tokio::test]
    async fn test_delete_without_filter_is_rejected_locally() {
        let mock_server = MockServer::start().await;

        let err = client(&mock_server, "items").delete().await.unwrap_err();
        assert!(matches!(err, PostgrestError::InvalidParameters(_)));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-24/*"), None);
    }
}
