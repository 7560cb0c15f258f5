//! Storage backends
//!
//! A [`Backend`] is the JSON-level collection and RPC interface the typed client
//! talks to. [`PostgrestBackend`] forwards to the hosted service;
//! [`MemoryBackend`] keeps the tables in process and evaluates the
//! aggregation functions itself.

mod memory;
mod postgrest;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;
use crate::postgrest::Filter;

pub use self::memory::{Clock, MemoryBackend};
pub use self::postgrest::PostgrestBackend;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Insert one row and return it as stored
    async fn insert(&self, table: &str, values: Value) -> Result<Value>;

    /// Rows matching a filter
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>>;

    /// Partially update the row with the given id and return it as stored
    async fn update(&self, table: &str, id: Uuid, values: Value) -> Result<Value>;

    /// Delete the row with the given id
    async fn delete(&self, table: &str, id: Uuid) -> Result<()>;

    /// Invoke a database function by name
    async fn rpc(&self, function: &str, args: Value) -> Result<Value>;
}
