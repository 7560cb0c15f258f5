//! Database operations through the PostgREST API

mod filter;
mod query;
mod types;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Serialize;

use crate::config::ClientOptions;
use crate::error::{Error, Result};

pub use filter::*;
pub use query::*;
pub use types::*;

/// Client for database operations against one PostgREST endpoint
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    /// The base URL for the project
    url: String,

    /// Headers sent with every request
    headers: HeaderMap,

    /// HTTP client
    client: Client,
}

impl PostgrestClient {
    /// Create a new PostgrestClient
    pub fn new(url: &str, key: &str, client: Client, options: &ClientOptions) -> Result<Self> {
        let mut this = Self {
            url: url.trim_end_matches('/').to_string(),
            headers: HeaderMap::new(),
            client,
        };
        this.set_header("apikey", key)?;
        this.set_header("Authorization", &format!("Bearer {}", key))?;
        this.set_header("X-Client-Info", &options.client_info)?;
        this.set_header("Accept-Profile", &options.db_schema)?;
        this.set_header("Content-Profile", &options.db_schema)?;
        Ok(this)
    }

    fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::config(format!("invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::config(format!("invalid header value for {}: {}", name, e)))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Use a user access token instead of the anon key for authorization
    pub fn with_auth(mut self, token: &str) -> Result<Self> {
        self.set_header("Authorization", &format!("Bearer {}", token))?;
        Ok(self)
    }

    /// Get the REST URL for a table
    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    /// Select specific columns from a table
    pub fn select(&self, table: &str, columns: &str) -> SelectBuilder {
        SelectBuilder::new(
            self.table_url(table),
            self.headers.clone(),
            columns,
            self.client.clone(),
        )
    }

    /// Insert data into a table
    pub fn insert<T: Serialize>(&self, table: &str, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(
            self.table_url(table),
            self.headers.clone(),
            values,
            self.client.clone(),
        )
    }

    /// Update data in a table
    pub fn update<T: Serialize>(&self, table: &str, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(
            self.table_url(table),
            self.headers.clone(),
            values,
            self.client.clone(),
        )
    }

    /// Delete data from a table
    pub fn delete(&self, table: &str) -> DeleteBuilder {
        DeleteBuilder::new(
            self.table_url(table),
            self.headers.clone(),
            self.client.clone(),
        )
    }

    /// Call a stored procedure or function
    pub fn rpc<T: Serialize>(&self, function: &str, params: T) -> RpcBuilder<T> {
        let url = format!("{}/rest/v1/rpc/{}", self.url, function);
        RpcBuilder::new(url, self.headers.clone(), params, self.client.clone())
    }
}
