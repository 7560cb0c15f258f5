//! Backend for the hosted project, speaking PostgREST

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

use super::Backend;
use crate::config::OrbitConfig;
use crate::error::{Error, Result};
use crate::postgrest::{Filter, PostgrestClient};

/// Backend that forwards every call to a PostgREST endpoint
#[derive(Debug, Clone)]
pub struct PostgrestBackend {
    client: PostgrestClient,
}

impl PostgrestBackend {
    pub fn new(config: &OrbitConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        let client = PostgrestClient::new(
            &config.base_url(),
            &config.anon_key,
            http,
            &config.options,
        )?;
        Ok(Self { client })
    }

    /// Send a signed-in user's access token so row level security applies to them
    pub fn with_auth(self, token: &str) -> Result<Self> {
        Ok(Self {
            client: self.client.with_auth(token)?,
        })
    }
}

fn api_code(err: &Error) -> Option<&str> {
    match err {
        Error::Api { details, .. } => details.code.as_deref(),
        _ => None,
    }
}

fn table_error(table: &str, err: Error) -> Error {
    match api_code(&err) {
        Some("42P01") | Some("PGRST205") => Error::UnknownTable(table.to_string()),
        _ => err,
    }
}

/// Unique violations on the primary key become `Conflict`
fn insert_error(table: &str, id: Option<Uuid>, err: Error) -> Error {
    match (api_code(&err), id) {
        (Some("23505"), Some(id)) => Error::Conflict {
            table: table.to_string(),
            id,
        },
        _ => table_error(table, err),
    }
}

fn first_row(table: &str, rows: Vec<Value>) -> Result<Value> {
    rows.into_iter().next().ok_or_else(|| {
        Error::UnexpectedResponse(format!("no row returned from {}", table))
    })
}

#[async_trait]
impl Backend for PostgrestBackend {
    async fn insert(&self, table: &str, values: Value) -> Result<Value> {
        let id = values
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok());
        let rows: Vec<Value> = self
            .client
            .insert(table, values)
            .execute()
            .await
            .map_err(|e| insert_error(table, id, e))?;
        first_row(table, rows)
    }

    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>> {
        self.client
            .select(table, "*")
            .filter(filter)
            .execute()
            .await
            .map_err(|e| table_error(table, e))
    }

    async fn update(&self, table: &str, id: Uuid, mut values: Value) -> Result<Value> {
        if let Value::Object(map) = &mut values {
            map.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));
        }
        let rows: Vec<Value> = self
            .client
            .update(table, values)
            .eq("id", id)
            .execute()
            .await
            .map_err(|e| table_error(table, e))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::not_found(table, id))
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<()> {
        let rows: Vec<Value> = self
            .client
            .delete(table)
            .eq("id", id)
            .execute()
            .await
            .map_err(|e| table_error(table, e))?;
        if rows.is_empty() {
            return Err(Error::not_found(table, id));
        }
        debug!("deleted {} {}", table, id);
        Ok(())
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value> {
        self.client
            .rpc(function, args)
            .execute()
            .await
            .map_err(|e| match api_code(&e) {
                Some("PGRST202") | Some("42883") => Error::UnknownFunction(function.to_string()),
                _ => e,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorDetails;

    fn api(code: &str) -> Error {
        Error::Api {
            status: 404,
            details: ApiErrorDetails {
                code: Some(code.to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn missing_relation_maps_to_unknown_table() {
        assert!(matches!(
            table_error("budgets", api("42P01")),
            Error::UnknownTable(t) if t == "budgets"
        ));
        assert!(matches!(table_error("tasks", api("23505")), Error::Api { .. }));
    }

    #[test]
    fn duplicate_key_maps_to_conflict() {
        let id = Uuid::new_v4();
        assert!(matches!(
            insert_error("profiles", Some(id), api("23505")),
            Error::Conflict { id: got, .. } if got == id
        ));
        assert!(matches!(insert_error("profiles", None, api("23505")), Error::Api { .. }));
        assert!(matches!(
            insert_error("budgets", Some(id), api("42P01")),
            Error::UnknownTable(_)
        ));
    }

    #[test]
    fn empty_insert_response_is_unexpected() {
        assert!(matches!(
            first_row("tasks", Vec::new()),
            Err(Error::UnexpectedResponse(_))
        ));
    }
}
