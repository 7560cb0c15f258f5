//! In-process backend
//!
//! Holds the four tables behind one `RwLock` and answers the aggregation
//! functions from the stored rows. Every write validates first and commits
//! last, so a rejected write leaves the tables untouched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Backend;
use crate::error::{Error, Result};
use crate::functions::{aggregates, check_days_ahead, RpcFunction, UpcomingEventsArgs, UserArgs};
use crate::postgrest::Filter;
use crate::schema::{
    parse_insert, parse_update, Profile, ScheduleEvent, Table, Task, Transaction, TransactionType,
};

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Default)]
struct Tables {
    profiles: BTreeMap<Uuid, Profile>,
    transactions: BTreeMap<Uuid, Transaction>,
    tasks: BTreeMap<Uuid, Task>,
    schedule_events: BTreeMap<Uuid, ScheduleEvent>,
}

/// Maps a table type to its storage
trait Stored: Table {
    fn rows(tables: &Tables) -> &BTreeMap<Uuid, Self>;
    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<Uuid, Self>;
}

impl Stored for Profile {
    fn rows(tables: &Tables) -> &BTreeMap<Uuid, Self> {
        &tables.profiles
    }
    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<Uuid, Self> {
        &mut tables.profiles
    }
}

impl Stored for Transaction {
    fn rows(tables: &Tables) -> &BTreeMap<Uuid, Self> {
        &tables.transactions
    }
    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<Uuid, Self> {
        &mut tables.transactions
    }
}

impl Stored for Task {
    fn rows(tables: &Tables) -> &BTreeMap<Uuid, Self> {
        &tables.tasks
    }
    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<Uuid, Self> {
        &mut tables.tasks
    }
}

impl Stored for ScheduleEvent {
    fn rows(tables: &Tables) -> &BTreeMap<Uuid, Self> {
        &tables.schedule_events
    }
    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<Uuid, Self> {
        &mut tables.schedule_events
    }
}

fn check_owner<T: Table>(tables: &Tables, row: &T) -> Result<()> {
    match row.owner() {
        Some(owner) if !tables.profiles.contains_key(&owner) => Err(Error::UnknownUser(owner)),
        _ => Ok(()),
    }
}

fn insert_row<T: Stored>(tables: &mut Tables, values: Value, now: DateTime<Utc>) -> Result<Value> {
    let insert = parse_insert::<T>(values)?;
    let row = T::from_insert(insert, now);
    check_owner(tables, &row)?;

    let id = row.id();
    let rows = T::rows_mut(tables);
    if rows.contains_key(&id) {
        return Err(Error::Conflict {
            table: T::table_name().to_string(),
            id,
        });
    }
    let value = serde_json::to_value(&row)?;
    rows.insert(id, row);
    Ok(value)
}

fn select_rows<T: Stored>(tables: &Tables, filter: &Filter) -> Result<Vec<Value>> {
    let rows = T::rows(tables)
        .values()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(filter.apply(rows))
}

fn update_row<T: Stored>(
    tables: &mut Tables,
    id: Uuid,
    values: Value,
    now: DateTime<Utc>,
) -> Result<Value> {
    let update = parse_update::<T>(values)?;
    let mut row = T::rows(tables)
        .get(&id)
        .cloned()
        .ok_or_else(|| Error::not_found(T::table_name(), id))?;
    row.apply_update(update, now)?;
    check_owner(tables, &row)?;

    let value = serde_json::to_value(&row)?;
    T::rows_mut(tables).insert(id, row);
    Ok(value)
}

fn delete_row<T: Stored>(tables: &mut Tables, id: Uuid) -> Result<()> {
    T::rows_mut(tables)
        .remove(&id)
        .map(|_| ())
        .ok_or_else(|| Error::not_found(T::table_name(), id))
}

fn parse_args<A: DeserializeOwned>(function: RpcFunction, args: Value) -> Result<A> {
    serde_json::from_value(args).map_err(|e| {
        Error::validation(format!("invalid arguments for {}: {}", function.as_str(), e))
    })
}

/// Backend that keeps every table in memory
pub struct MemoryBackend {
    tables: RwLock<Tables>,
    clock: Clock,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Use a fixed or simulated clock for timestamps and the upcoming-events window
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBackend").finish_non_exhaustive()
    }
}

fn log_rejection<T>(op: &str, table: &str, result: &Result<T>) {
    if let Err(e) = result {
        warn!("{} on {} rejected: {}", op, table, e);
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn insert(&self, table: &str, values: Value) -> Result<Value> {
        debug!("memory insert into {}", table);
        let now = self.now();
        let mut tables = self.tables.write().await;
        let result = match table {
            "profiles" => insert_row::<Profile>(&mut tables, values, now),
            "transactions" => insert_row::<Transaction>(&mut tables, values, now),
            "tasks" => insert_row::<Task>(&mut tables, values, now),
            "schedule_events" => insert_row::<ScheduleEvent>(&mut tables, values, now),
            other => Err(Error::UnknownTable(other.to_string())),
        };
        log_rejection("insert", table, &result);
        result
    }

    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>> {
        debug!("memory select from {}", table);
        let tables = self.tables.read().await;
        match table {
            "profiles" => select_rows::<Profile>(&tables, filter),
            "transactions" => select_rows::<Transaction>(&tables, filter),
            "tasks" => select_rows::<Task>(&tables, filter),
            "schedule_events" => select_rows::<ScheduleEvent>(&tables, filter),
            other => Err(Error::UnknownTable(other.to_string())),
        }
    }

    async fn update(&self, table: &str, id: Uuid, values: Value) -> Result<Value> {
        debug!("memory update {} {}", table, id);
        let now = self.now();
        let mut tables = self.tables.write().await;
        let result = match table {
            "profiles" => update_row::<Profile>(&mut tables, id, values, now),
            "transactions" => update_row::<Transaction>(&mut tables, id, values, now),
            "tasks" => update_row::<Task>(&mut tables, id, values, now),
            "schedule_events" => update_row::<ScheduleEvent>(&mut tables, id, values, now),
            other => Err(Error::UnknownTable(other.to_string())),
        };
        log_rejection("update", table, &result);
        result
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<()> {
        debug!("memory delete {} {}", table, id);
        let mut tables = self.tables.write().await;
        let result = match table {
            "profiles" => delete_row::<Profile>(&mut tables, id).map(|()| {
                // owned rows go with their profile
                tables.transactions.retain(|_, row| row.user_id != id);
                tables.tasks.retain(|_, row| row.user_id != id);
                tables.schedule_events.retain(|_, row| row.user_id != id);
            }),
            "transactions" => delete_row::<Transaction>(&mut tables, id),
            "tasks" => delete_row::<Task>(&mut tables, id),
            "schedule_events" => delete_row::<ScheduleEvent>(&mut tables, id),
            other => Err(Error::UnknownTable(other.to_string())),
        };
        log_rejection("delete", table, &result);
        result
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value> {
        debug!("memory rpc {}", function);
        let function = RpcFunction::from_name(function)
            .ok_or_else(|| Error::UnknownFunction(function.to_string()))?;
        let tables = self.tables.read().await;

        let value = match function {
            RpcFunction::UserBalance => {
                let args: UserArgs = parse_args(function, args)?;
                serde_json::to_value(aggregates::user_balance(
                    tables.transactions.values(),
                    args.user_uuid,
                ))?
            }
            RpcFunction::SpendingByCategory => {
                let args: UserArgs = parse_args(function, args)?;
                serde_json::to_value(aggregates::totals_by_category(
                    tables.transactions.values(),
                    args.user_uuid,
                    TransactionType::Expense,
                ))?
            }
            RpcFunction::IncomeByCategory => {
                let args: UserArgs = parse_args(function, args)?;
                serde_json::to_value(aggregates::totals_by_category(
                    tables.transactions.values(),
                    args.user_uuid,
                    TransactionType::Income,
                ))?
            }
            RpcFunction::TaskStats => {
                let args: UserArgs = parse_args(function, args)?;
                // one-row result set, as the database function returns it
                serde_json::to_value(vec![aggregates::task_stats(
                    tables.tasks.values(),
                    args.user_uuid,
                )])?
            }
            RpcFunction::UpcomingEvents => {
                let args: UpcomingEventsArgs = parse_args(function, args)?;
                check_days_ahead(args.days_ahead)?;
                let days_ahead = args.days_ahead.unwrap_or(aggregates::DEFAULT_DAYS_AHEAD);
                serde_json::to_value(aggregates::upcoming_events(
                    tables.schedule_events.values(),
                    args.user_uuid,
                    self.now().date_naive(),
                    days_ahead,
                )?)?
            }
            RpcFunction::EventStats => {
                let args: UserArgs = parse_args(function, args)?;
                serde_json::to_value(aggregates::event_stats(
                    tables.schedule_events.values(),
                    args.user_uuid,
                ))?
            }
        };
        Ok(value)
    }
}
