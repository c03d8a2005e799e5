//! Reelhouse client library
//!
//! Typed client for a wedding film studio's website and its admin dashboard.
//! All state lives in the hosted backend (table API, auth, object storage);
//! this crate models the public page regions and the admin panels as view
//! state whose async operations talk to that backend.

pub mod admin;
pub mod collection;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod notice;
pub mod routes;
pub mod scope;
pub mod site;

use std::sync::Arc;

use reqwest::Client;
use reelhouse_auth::Auth;
use reelhouse_postgrest::PostgrestClient;
use reelhouse_storage::StorageClient;

use crate::config::{ClientOptions, SiteConfig};
use crate::error::Result;
use crate::models::Table;

pub use reelhouse_auth as auth;
pub use reelhouse_postgrest as postgrest;
pub use reelhouse_storage as storage;

/// The main entry point for the Reelhouse client
///
/// Cloning is cheap; clones share the HTTP client and the session store.
#[derive(Clone)]
pub struct Reelhouse {
    /// The base URL of the backend
    pub url: String,
    /// The anonymous API key
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    auth: Arc<Auth>,
    options: ClientOptions,
}

impl Reelhouse {
    /// Create a new client
    ///
    /// # Example
    ///
    /// ```
    /// use reelhouse::{config::SiteConfig, Reelhouse};
    ///
    /// let config = SiteConfig::new("https://your-project-url.supabase.co", "your-anon-key").unwrap();
    /// let client = Reelhouse::new(config).unwrap();
    /// ```
    pub fn new(config: SiteConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let auth = Auth::new(&config.url, &config.anon_key, http_client.clone());

        Ok(Self {
            url: config.url,
            key: config.anon_key,
            http_client,
            auth: Arc::new(auth),
            options: config.options,
        })
    }

    /// Create a client from `SUPABASE_URL` / `SUPABASE_ANON_KEY`
    pub fn from_env() -> Result<Self> {
        Self::new(SiteConfig::from_env()?)
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Query builder for one of the site's tables, acting as the signed-in
    /// user when there is one and as the anonymous visitor otherwise.
    pub fn from(&self, table: Table) -> Result<PostgrestClient> {
        let client = PostgrestClient::new(&self.url, &self.key, table.as_str(), self.http_client.clone());
        Ok(client.with_auth(&self.bearer())?)
    }

    /// Storage client carrying the current session's token
    pub fn storage(&self) -> StorageClient {
        StorageClient::new(&self.url, &self.key, self.http_client.clone()).with_auth(&self.bearer())
    }

    fn bearer(&self) -> String {
        self.auth
            .get_session()
            .map(|session| session.access_token)
            .unwrap_or_else(|| self.key.clone())
    }
}

impl std::fmt::Debug for Reelhouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reelhouse")
            .field("url", &self.url)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::collection::{DataList, Refresh};
    pub use crate::config::{ClientOptions, SiteConfig};
    pub use crate::error::{Error, Result};
    pub use crate::models::{Record, Table};
    pub use crate::notice::{Notice, NoticeVariant, Notices};
    pub use crate::routes::Route;
    pub use crate::scope::ViewScope;
    pub use crate::Reelhouse;
}
