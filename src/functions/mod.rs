//! Typed access to the database's aggregation functions (PostgREST RPC)

pub mod aggregates;

use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::schema::{Category, EventType, ScheduleEvent};

pub use aggregates::DEFAULT_DAYS_AHEAD;

/// The aggregation functions exposed by the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcFunction {
    UserBalance,
    SpendingByCategory,
    IncomeByCategory,
    TaskStats,
    UpcomingEvents,
    EventStats,
}

impl RpcFunction {
    pub const ALL: [RpcFunction; 6] = [
        RpcFunction::UserBalance,
        RpcFunction::SpendingByCategory,
        RpcFunction::IncomeByCategory,
        RpcFunction::TaskStats,
        RpcFunction::UpcomingEvents,
        RpcFunction::EventStats,
    ];

    /// Convert the function to its database name
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcFunction::UserBalance => "get_user_balance",
            RpcFunction::SpendingByCategory => "get_spending_by_category",
            RpcFunction::IncomeByCategory => "get_income_by_category",
            RpcFunction::TaskStats => "get_task_stats",
            RpcFunction::UpcomingEvents => "get_upcoming_events",
            RpcFunction::EventStats => "get_event_stats",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// Arguments shared by every function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserArgs {
    pub user_uuid: Uuid,
}

/// Arguments for `get_upcoming_events`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpcomingEventsArgs {
    pub user_uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_ahead: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
}

/// Task counters; `pending_tasks == total_tasks - completed_tasks`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    pub high_priority: i64,
    pub medium_priority: i64,
    pub low_priority: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeCount {
    pub event_type: EventType,
    pub count: i64,
}

pub(crate) fn check_days_ahead(days_ahead: Option<i64>) -> Result<()> {
    match days_ahead {
        Some(days) if days < 0 => Err(Error::validation(format!(
            "days_ahead must not be negative, got {}",
            days
        ))),
        _ => Ok(()),
    }
}

/// Client for the aggregation functions
#[derive(Clone)]
pub struct Functions {
    backend: Arc<dyn Backend>,
}

impl Functions {
    pub(crate) fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    async fn call<A: Serialize, R: DeserializeOwned>(&self, function: RpcFunction, args: A) -> Result<R> {
        debug!("rpc {}", function.as_str());
        let args = serde_json::to_value(args)?;
        let value = self.backend.rpc(function.as_str(), args).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Income minus expenses; 0 for a user without transactions
    pub async fn get_user_balance(&self, user: Uuid) -> Result<f64> {
        // SUM over no rows comes back as null
        let balance: Option<f64> = self
            .call(RpcFunction::UserBalance, UserArgs { user_uuid: user })
            .await?;
        Ok(balance.unwrap_or(0.0))
    }

    pub async fn get_spending_by_category(&self, user: Uuid) -> Result<Vec<CategoryTotal>> {
        self.call(RpcFunction::SpendingByCategory, UserArgs { user_uuid: user })
            .await
    }

    pub async fn get_income_by_category(&self, user: Uuid) -> Result<Vec<CategoryTotal>> {
        self.call(RpcFunction::IncomeByCategory, UserArgs { user_uuid: user })
            .await
    }

    pub async fn get_task_stats(&self, user: Uuid) -> Result<TaskStats> {
        let rows: Vec<TaskStats> = self
            .call(RpcFunction::TaskStats, UserArgs { user_uuid: user })
            .await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    /// Events in the next `days_ahead` days (default 7), ordered by date then time
    pub async fn get_upcoming_events(
        &self,
        user: Uuid,
        days_ahead: Option<i64>,
    ) -> Result<Vec<ScheduleEvent>> {
        check_days_ahead(days_ahead)?;
        self.call(
            RpcFunction::UpcomingEvents,
            UpcomingEventsArgs {
                user_uuid: user,
                days_ahead,
            },
        )
        .await
    }

    pub async fn get_event_stats(&self, user: Uuid) -> Result<Vec<EventTypeCount>> {
        self.call(RpcFunction::EventStats, UserArgs { user_uuid: user })
            .await
    }

    /// Call a function by name with raw JSON arguments
    pub async fn invoke(&self, function: &str, args: Value) -> Result<Value> {
        self.backend.rpc(function, args).await
    }
}
