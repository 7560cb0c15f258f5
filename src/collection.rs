//! Typed CRUD over one table

use log::debug;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::postgrest::Filter;
use crate::schema::{parse_insert, parse_update, Table, Validate};

/// Handle to one table of the schema
pub struct Collection<T: Table> {
    backend: Arc<dyn Backend>,
    _table: PhantomData<fn() -> T>,
}

impl<T: Table> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            _table: PhantomData,
        }
    }
}

impl<T: Table> Collection<T> {
    pub(crate) fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            _table: PhantomData,
        }
    }

    pub fn table_name(&self) -> &'static str {
        T::table_name()
    }

    /// Insert a row and return it with server defaults filled in
    pub async fn insert(&self, insert: T::Insert) -> Result<T> {
        insert.validate()?;
        let values = serde_json::to_value(&insert)?;
        self.insert_values(values).await
    }

    /// Insert from an untyped JSON payload
    pub async fn insert_json(&self, values: Value) -> Result<T> {
        // reject before anything reaches the backend
        parse_insert::<T>(values.clone())?;
        self.insert_values(values).await
    }

    async fn insert_values(&self, values: Value) -> Result<T> {
        debug!("insert into {}", T::table_name());
        let row = self.backend.insert(T::table_name(), values).await?;
        Ok(serde_json::from_value(row)?)
    }

    /// Rows matching a filter
    pub async fn select(&self, filter: &Filter) -> Result<Vec<T>> {
        let rows = self.backend.select(T::table_name(), filter).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Error::from))
            .collect()
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<T>> {
        let mut rows = self.select(&Filter::new().eq("id", id).limit(1)).await?;
        Ok(rows.pop())
    }

    /// Apply a partial update; fields left as `None` keep their value
    pub async fn update(&self, id: Uuid, update: T::Update) -> Result<T> {
        update.validate()?;
        let values = serde_json::to_value(&update)?;
        self.update_values(id, values).await
    }

    /// Update from an untyped JSON payload
    pub async fn update_json(&self, id: Uuid, values: Value) -> Result<T> {
        parse_update::<T>(values.clone())?;
        self.update_values(id, values).await
    }

    async fn update_values(&self, id: Uuid, mut values: Value) -> Result<T> {
        if let Value::Object(map) = &mut values {
            if let Some(requested) = map.get("id") {
                let requested = requested.as_str().and_then(|s| Uuid::parse_str(s).ok());
                if requested != Some(id) {
                    return Err(Error::ImmutableId {
                        table: T::table_name().to_string(),
                        id,
                    });
                }
            }
            // stamped by the backend
            map.remove("updated_at");
        }
        debug!("update {} {}", T::table_name(), id);
        let row = self.backend.update(T::table_name(), id, values).await?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        debug!("delete {} {}", T::table_name(), id);
        self.backend.delete(T::table_name(), id).await
    }
}
