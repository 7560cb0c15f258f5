//! Orbit Supabase client library
//!
//! Typed access to the Orbit app's database: profiles, transactions, tasks
//! and schedule events, plus the aggregation functions behind the dashboards.
//! The same API runs against the hosted project through PostgREST or against
//! an in-process backend.

pub mod backend;
pub mod collection;
pub mod config;
pub mod error;
pub mod fetch;
pub mod functions;
pub mod postgrest;
pub mod schema;

use std::sync::Arc;

use crate::backend::{Backend, MemoryBackend, PostgrestBackend};
use crate::collection::Collection;
use crate::config::OrbitConfig;
use crate::error::Result;
use crate::functions::Functions;
use crate::schema::{Profile, ScheduleEvent, Task, Transaction};

/// The main entry point for the Orbit client
#[derive(Clone)]
pub struct OrbitClient {
    backend: Arc<dyn Backend>,
}

impl OrbitClient {
    /// Create a client on top of any backend
    pub fn from_backend(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Connect to the hosted project
    ///
    /// # Example
    ///
    /// ```
    /// use orbit_supabase::{config::OrbitConfig, OrbitClient};
    ///
    /// let config = OrbitConfig::new("https://your-project-url.supabase.co", "your-anon-key").unwrap();
    /// let client = OrbitClient::connect(&config).unwrap();
    /// ```
    pub fn connect(config: &OrbitConfig) -> Result<Self> {
        Ok(Self::from_backend(Arc::new(PostgrestBackend::new(config)?)))
    }

    /// A client backed by fresh in-memory tables
    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryBackend::new()))
    }

    pub fn profiles(&self) -> Collection<Profile> {
        Collection::new(self.backend.clone())
    }

    pub fn transactions(&self) -> Collection<Transaction> {
        Collection::new(self.backend.clone())
    }

    pub fn tasks(&self) -> Collection<Task> {
        Collection::new(self.backend.clone())
    }

    pub fn schedule_events(&self) -> Collection<ScheduleEvent> {
        Collection::new(self.backend.clone())
    }

    /// The aggregation functions
    pub fn functions(&self) -> Functions {
        Functions::new(self.backend.clone())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{ClientOptions, OrbitConfig};
    pub use crate::error::Error;
    pub use crate::postgrest::Filter;
    pub use crate::schema::*;
    pub use crate::OrbitClient;
}
