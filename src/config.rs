//! Configuration for the Reelhouse client

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Storage bucket holding uploaded portfolio images
pub const DEFAULT_PORTFOLIO_BUCKET: &str = "portfolio";

/// Phone number shown when the site settings don't provide one
pub const DEFAULT_CONTACT_PHONE: &str = "+31 6 12345678";

/// How long the contact confirmation stays up on its own
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables for the client and the views built on it
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout; `None` keeps the HTTP client's defaults
    pub request_timeout: Option<Duration>,

    /// Bucket that portfolio uploads go to
    pub portfolio_bucket: String,

    /// Auto-dismiss delay of the contact confirmation
    pub confirmation_timeout: Duration,

    /// Fallback phone number for the contact confirmation
    pub contact_phone: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: None,
            portfolio_bucket: DEFAULT_PORTFOLIO_BUCKET.to_string(),
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            contact_phone: DEFAULT_CONTACT_PHONE.to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the portfolio bucket
    pub fn with_portfolio_bucket(mut self, value: &str) -> Self {
        self.portfolio_bucket = value.to_string();
        self
    }

    /// Set the confirmation auto-dismiss delay
    pub fn with_confirmation_timeout(mut self, value: Duration) -> Self {
        self.confirmation_timeout = value;
        self
    }

    /// Set the fallback contact phone
    pub fn with_contact_phone(mut self, value: &str) -> Self {
        self.contact_phone = value.to_string();
        self
    }
}

/// Where the backend lives and how to talk to it
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub url: String,
    pub anon_key: String,
    pub options: ClientOptions,
}

impl SiteConfig {
    pub fn new(url: &str, anon_key: &str) -> Result<Self, Error> {
        Url::parse(url).map_err(|e| Error::config(format!("invalid backend url {}: {}", url, e)))?;

        if anon_key.trim().is_empty() {
            return Err(Error::config("anon_key cannot be empty"));
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            options: ClientOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the configuration from the environment, reading `.env` first
    /// when one is present.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        let url = env::var("SUPABASE_URL")
            .map_err(|_| Error::config("SUPABASE_URL environment variable not set"))?;
        let anon_key = env::var("SUPABASE_ANON_KEY")
            .or_else(|_| env::var("SUPABASE_KEY"))
            .map_err(|_| Error::config("SUPABASE_ANON_KEY environment variable not set"))?;

        let mut options = ClientOptions::default();

        if let Ok(raw) = env::var("REELHOUSE_REQUEST_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                Error::config(format!("REELHOUSE_REQUEST_TIMEOUT_SECS is not a number: {}", raw))
            })?;
            options = options.with_request_timeout(Some(Duration::from_secs(secs)));
        }
        if let Ok(bucket) = env::var("REELHOUSE_PORTFOLIO_BUCKET") {
            options = options.with_portfolio_bucket(&bucket);
        }
        if let Ok(phone) = env::var("REELHOUSE_CONTACT_PHONE") {
            options = options.with_contact_phone(&phone);
        }

        Ok(Self::new(&url, &anon_key)?.with_options(options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();
        assert!(options.request_timeout.is_none());
        assert_eq!(options.portfolio_bucket, "portfolio");
        assert_eq!(options.confirmation_timeout, Duration::from_secs(5));
        assert_eq!(options.contact_phone, "+31 6 12345678");
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(matches!(
            SiteConfig::new("not a url", "key"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            SiteConfig::new("https://abc.supabase.co", "  "),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = SiteConfig::new("https://abc.supabase.co/", "key").unwrap();
        assert_eq!(config.url, "https://abc.supabase.co");
    }
}
