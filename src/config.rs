//! Configuration options for the Orbit client

use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Configuration options for the hosted backend client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema exposed through PostgREST
    pub db_schema: String,

    /// Value sent in the `X-Client-Info` header
    pub client_info: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
            client_info: format!("orbit-supabase/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set the client info header value
    pub fn with_client_info(mut self, value: &str) -> Self {
        self.client_info = value.to_string();
        self
    }
}

/// Connection settings for the hosted project.
#[derive(Debug, Clone)]
pub struct OrbitConfig {
    pub url: Url,
    pub anon_key: String,
    pub options: ClientOptions,
}

impl OrbitConfig {
    /// Creates a new configuration, validating the URL.
    pub fn new(url_str: &str, anon_key: &str) -> Result<Self> {
        let url = Url::parse(url_str)?;
        if anon_key.is_empty() {
            return Err(Error::config("anon_key cannot be empty"));
        }
        Ok(Self {
            url,
            anon_key: anon_key.to_string(),
            options: ClientOptions::default(),
        })
    }

    /// Reads `SUPABASE_URL` and `SUPABASE_ANON_KEY` from the environment.
    pub fn from_env() -> Result<Self> {
        let url_str = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::config("SUPABASE_URL environment variable not found"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| Error::config("SUPABASE_ANON_KEY environment variable not found"))?;
        Self::new(&url_str, &anon_key)
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Base URL without a trailing slash
    pub(crate) fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}
