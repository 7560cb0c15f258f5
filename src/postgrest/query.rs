//! Query builders for PostgrestClient

use reqwest::{header::HeaderMap, Client};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Error;
use crate::fetch::Fetch;
use crate::postgrest::filter::Filter;
use crate::postgrest::types::ReturnOption;

/// Base query builder
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    /// Query parameters, in insertion order
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    /// Create a new QueryBuilder
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter to the query
    pub fn add_param(&mut self, key: &str, value: &str) {
        self.params.push((key.to_string(), value.to_string()));
    }

    /// Add every condition, ordering and limit of a filter
    pub fn add_filter(&mut self, filter: &Filter) {
        self.params.extend(filter.to_query_pairs());
    }

    /// Get the query parameters
    pub fn get_params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Builder for SELECT queries
pub struct SelectBuilder {
    /// The table URL
    url: String,

    /// Headers shared by every request (apikey, auth, profile)
    headers: HeaderMap,

    /// HTTP client
    client: Client,

    /// Query builder
    query: QueryBuilder,
}

impl SelectBuilder {
    /// Create a new SelectBuilder
    pub fn new(url: String, headers: HeaderMap, columns: &str, client: Client) -> Self {
        let mut query = QueryBuilder::new();
        query.add_param("select", columns);

        Self {
            url,
            headers,
            client,
            query,
        }
    }

    /// Apply a filter
    pub fn filter(mut self, filter: &Filter) -> Self {
        self.query.add_filter(filter);
        self
    }

    /// Execute the query and return the results
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        Fetch::get(&self.client, &self.url)
            .headers(&self.headers)
            .query(self.query.get_params())
            .execute::<Vec<T>>()
            .await
    }
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    url: String,
    headers: HeaderMap,
    values: T,
    client: Client,
}

impl<T: Serialize> InsertBuilder<T> {
    /// Create a new InsertBuilder
    pub fn new(url: String, headers: HeaderMap, values: T, client: Client) -> Self {
        Self {
            url,
            headers,
            values,
            client,
        }
    }

    /// Execute the query and return the inserted rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        Fetch::post(&self.client, &self.url)
            .headers(&self.headers)
            .header("Prefer", &ReturnOption::Representation.prefer_header())
            .json(&self.values)?
            .execute::<Vec<R>>()
            .await
    }
}

/// Builder for UPDATE queries
pub struct UpdateBuilder<T: Serialize> {
    url: String,
    headers: HeaderMap,
    values: T,
    client: Client,
    query: QueryBuilder,
}

impl<T: Serialize> UpdateBuilder<T> {
    /// Create a new UpdateBuilder
    pub fn new(url: String, headers: HeaderMap, values: T, client: Client) -> Self {
        Self {
            url,
            headers,
            values,
            client,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(mut self, column: &str, value: V) -> Self {
        let filter = format!("eq.{}", value.to_string());
        self.query.add_param(column, &filter);
        self
    }

    /// Execute the query and return the updated rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        Fetch::patch(&self.client, &self.url)
            .headers(&self.headers)
            .header("Prefer", &ReturnOption::Representation.prefer_header())
            .query(self.query.get_params())
            .json(&self.values)?
            .execute::<Vec<R>>()
            .await
    }
}

/// Builder for DELETE queries
pub struct DeleteBuilder {
    url: String,
    headers: HeaderMap,
    client: Client,
    query: QueryBuilder,
}

impl DeleteBuilder {
    /// Create a new DeleteBuilder
    pub fn new(url: String, headers: HeaderMap, client: Client) -> Self {
        Self {
            url,
            headers,
            client,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(mut self, column: &str, value: V) -> Self {
        let filter = format!("eq.{}", value.to_string());
        self.query.add_param(column, &filter);
        self
    }

    /// Execute the query and return the deleted rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        Fetch::delete(&self.client, &self.url)
            .headers(&self.headers)
            .header("Prefer", &ReturnOption::Representation.prefer_header())
            .query(self.query.get_params())
            .execute::<Vec<R>>()
            .await
    }
}

/// Builder for RPC (stored procedure) calls
pub struct RpcBuilder<T: Serialize> {
    url: String,
    headers: HeaderMap,
    params: T,
    client: Client,
}

impl<T: Serialize> RpcBuilder<T> {
    /// Create a new RpcBuilder
    pub fn new(url: String, headers: HeaderMap, params: T, client: Client) -> Self {
        Self {
            url,
            headers,
            params,
            client,
        }
    }

    /// Execute the RPC call and return the results
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R, Error> {
        Fetch::post(&self.client, &self.url)
            .headers(&self.headers)
            .json(&self.params)?
            .execute::<R>()
            .await
    }
}
