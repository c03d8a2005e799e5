//! Storage client for Reelhouse
//!
//! Uploads objects into a bucket and derives their public URLs.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use url::Url;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),
}

impl StorageError {
    pub fn message(&self) -> String {
        match self {
            StorageError::ApiError(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Upload options
#[derive(Debug, Clone, Serialize, Default)]
pub struct FileOptions {
    pub cache_control: Option<String>,
    pub content_type: Option<String>,
    pub upsert: Option<bool>,
}

impl FileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_control(mut self, cache_control: &str) -> Self {
        self.cache_control = Some(cache_control.to_string());
        self
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    pub fn with_upsert(mut self, upsert: bool) -> Self {
        self.upsert = Some(upsert);
        self
    }
}

/// What the storage API answers after a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedObject {
    /// `bucket/path` of the stored object
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Best-effort MIME type from a file name's extension
pub fn content_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone)]
pub struct StorageClient {
    base_url: String,
    api_key: String,
    bearer: String,
    http_client: Client,
}

/// A client bound to one bucket
pub struct StorageBucketClient<'a> {
    parent: &'a StorageClient,
    bucket_id: String,
}

impl StorageClient {
    pub fn new(base_url: &str, api_key: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bearer: api_key.to_string(),
            http_client,
        }
    }

    /// Upload as a signed-in user instead of with the anon key
    pub fn with_auth(mut self, token: &str) -> Self {
        self.bearer = token.to_string();
        self
    }

    pub fn from<'a>(&'a self, bucket_id: &str) -> StorageBucketClient<'a> {
        StorageBucketClient {
            parent: self,
            bucket_id: bucket_id.to_string(),
        }
    }
}

impl<'a> StorageBucketClient<'a> {
    pub fn bucket_id(&self) -> &str {
        &self.bucket_id
    }

    /// Upload an in-memory object to `path` inside the bucket
    pub async fn upload_bytes(
        &self,
        path: &str,
        contents: Vec<u8>,
        options: Option<FileOptions>,
    ) -> Result<UploadedObject> {
        if path.is_empty() || path.starts_with('/') {
            return Err(StorageError::InvalidPath(path.to_string()));
        }

        let mut url = Url::parse(&self.parent.base_url)?;
        url.set_path(&format!("/storage/v1/object/{}/{}", self.bucket_id, path));

        let options = options.unwrap_or_default();
        let content_type = options
            .content_type
            .clone()
            .unwrap_or_else(|| content_type_for(path).to_string());

        let file_name = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());

        let part = Part::bytes(contents)
            .file_name(file_name)
            .mime_str(&content_type)?;
        let form = Form::new()
            .text(
                "cacheControl",
                options
                    .cache_control
                    .clone()
                    .unwrap_or_else(|| "3600".to_string()),
            )
            .part("", part);

        log::debug!("uploading {} to bucket {}", path, self.bucket_id);

        let response = self
            .parent
            .http_client
            .post(url)
            .header("apikey", &self.parent.api_key)
            .header("Authorization", format!("Bearer {}", &self.parent.bearer))
            .header("x-upsert", options.upsert.unwrap_or(false).to_string())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            let message = serde_json::from_str::<ErrorBody>(&error_text)
                .ok()
                .and_then(|body| body.message.or(body.error))
                .unwrap_or(error_text);
            return Err(StorageError::ApiError(message));
        }

        Ok(response.json::<UploadedObject>().await?)
    }

    /// Upload a file from disk to `path` inside the bucket
    pub async fn upload(
        &self,
        path: &str,
        file_path: &Path,
        options: Option<FileOptions>,
    ) -> Result<UploadedObject> {
        let contents = tokio::fs::read(file_path).await?;
        self.upload_bytes(path, contents, options).await
    }

    /// Public URL of an object in a public bucket
    pub fn get_public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.parent.base_url, self.bucket_id, path
        )
    }
}
