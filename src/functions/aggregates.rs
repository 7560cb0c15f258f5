//! Aggregation math behind the database functions
//!
//! All functions are read-only and scoped to one user. A user with no rows
//! (or no profile at all) gets zero / empty results.

use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{CategoryTotal, EventTypeCount, TaskStats};
use crate::error::{Error, Result};
use crate::schema::{Category, EventType, Priority, ScheduleEvent, Task, Transaction, TransactionType};

/// Lookahead used by `get_upcoming_events` when none is given
pub const DEFAULT_DAYS_AHEAD: i64 = 7;

/// Income minus expenses
pub fn user_balance<'a, I>(transactions: I, user: Uuid) -> f64
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|t| t.user_id == user)
        .map(Transaction::signed_amount)
        .sum()
}

/// Per-category totals for one transaction kind, largest first.
///
/// Categories without matching transactions are omitted.
pub fn totals_by_category<'a, I>(transactions: I, user: Uuid, kind: TransactionType) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: BTreeMap<Category, f64> = BTreeMap::new();
    for t in transactions
        .into_iter()
        .filter(|t| t.user_id == user && t.kind == kind)
    {
        *totals.entry(t.category).or_insert(0.0) += t.amount;
    }

    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    out.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });
    out
}

pub fn task_stats<'a, I>(tasks: I, user: Uuid) -> TaskStats
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut stats = TaskStats::default();
    for task in tasks.into_iter().filter(|t| t.user_id == user) {
        stats.total_tasks += 1;
        if task.completed {
            stats.completed_tasks += 1;
        }
        match task.priority {
            Priority::High => stats.high_priority += 1,
            Priority::Medium => stats.medium_priority += 1,
            Priority::Low => stats.low_priority += 1,
        }
    }
    stats.pending_tasks = stats.total_tasks - stats.completed_tasks;
    stats
}

/// Events dated in `[today, today + days_ahead]`, ordered by date then time.
///
/// Fails when `days_ahead` is negative or the window ends past the last
/// representable date.
pub fn upcoming_events<'a, I>(
    events: I,
    user: Uuid,
    today: NaiveDate,
    days_ahead: i64,
) -> Result<Vec<ScheduleEvent>>
where
    I: IntoIterator<Item = &'a ScheduleEvent>,
{
    let last = u64::try_from(days_ahead)
        .ok()
        .and_then(|days| today.checked_add_days(Days::new(days)))
        .ok_or_else(|| Error::validation(format!("days_ahead out of range: {}", days_ahead)))?;
    let mut out: Vec<ScheduleEvent> = events
        .into_iter()
        .filter(|e| e.user_id == user && e.date >= today && e.date <= last)
        .cloned()
        .collect();
    out.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
    Ok(out)
}

/// Event count per type, most frequent first
pub fn event_stats<'a, I>(events: I, user: Uuid) -> Vec<EventTypeCount>
where
    I: IntoIterator<Item = &'a ScheduleEvent>,
{
    let mut counts: BTreeMap<EventType, i64> = BTreeMap::new();
    for event in events.into_iter().filter(|e| e.user_id == user) {
        *counts.entry(event.kind).or_insert(0) += 1;
    }

    let mut out: Vec<EventTypeCount> = counts
        .into_iter()
        .map(|(event_type, count)| EventTypeCount { event_type, count })
        .collect();
    out.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.event_type.as_str().cmp(b.event_type.as_str()))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ScheduleEventInsert, Table, TaskInsert, TransactionInsert};
    use chrono::{NaiveTime, Utc};

    fn tx(user: Uuid, kind: TransactionType, category: Category, amount: f64) -> Transaction {
        Transaction::from_insert(
            TransactionInsert::new(user, "tx", amount, kind, category),
            Utc::now(),
        )
    }

    fn task(user: Uuid, priority: Priority, completed: bool) -> Task {
        Task::from_insert(
            TaskInsert::new(user, "task", priority).with_completed(completed),
            Utc::now(),
        )
    }

    fn event(user: Uuid, kind: EventType, date: NaiveDate, hour: u32) -> ScheduleEvent {
        ScheduleEvent::from_insert(
            ScheduleEventInsert::new(
                user,
                "event",
                kind,
                date,
                NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            ),
            Utc::now(),
        )
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn balance_and_breakdowns() {
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let rows = vec![
            tx(user, TransactionType::Expense, Category::Food, 20.0),
            tx(user, TransactionType::Expense, Category::Food, 5.0),
            tx(user, TransactionType::Income, Category::Salary, 100.0),
            tx(other, TransactionType::Expense, Category::Bills, 999.0),
        ];

        assert_eq!(user_balance(&rows, user), 75.0);
        assert_eq!(
            totals_by_category(&rows, user, TransactionType::Expense),
            vec![CategoryTotal {
                category: Category::Food,
                total: 25.0
            }]
        );
        assert_eq!(
            totals_by_category(&rows, user, TransactionType::Income),
            vec![CategoryTotal {
                category: Category::Salary,
                total: 100.0
            }]
        );
    }

    #[test]
    fn no_rows_means_zero() {
        let nobody = Uuid::new_v4();
        let rows: Vec<Transaction> = Vec::new();
        assert_eq!(user_balance(&rows, nobody), 0.0);
        assert!(totals_by_category(&rows, nobody, TransactionType::Expense).is_empty());
        assert_eq!(task_stats(&Vec::<Task>::new(), nobody), TaskStats::default());
        assert!(event_stats(&Vec::<ScheduleEvent>::new(), nobody).is_empty());
    }

    #[test]
    fn breakdown_is_sorted_and_sums_to_total() {
        let user = Uuid::new_v4();
        let rows = vec![
            tx(user, TransactionType::Expense, Category::Transport, 10.0),
            tx(user, TransactionType::Expense, Category::Bills, 60.0),
            tx(user, TransactionType::Expense, Category::Health, 10.0),
            tx(user, TransactionType::Expense, Category::Bills, 15.0),
        ];
        let totals = totals_by_category(&rows, user, TransactionType::Expense);
        let order: Vec<Category> = totals.iter().map(|t| t.category).collect();
        assert_eq!(order, vec![Category::Bills, Category::Health, Category::Transport]);
        assert_eq!(totals.iter().map(|t| t.total).sum::<f64>(), 95.0);
    }

    #[test]
    fn task_counts() {
        let user = Uuid::new_v4();
        let rows = vec![
            task(user, Priority::High, true),
            task(user, Priority::High, false),
            task(user, Priority::Low, false),
            task(Uuid::new_v4(), Priority::Medium, true),
        ];
        let stats = task_stats(&rows, user);
        assert_eq!(
            stats,
            TaskStats {
                total_tasks: 3,
                completed_tasks: 1,
                pending_tasks: 2,
                high_priority: 2,
                medium_priority: 0,
                low_priority: 1,
            }
        );
    }

    #[test]
    fn upcoming_window_and_order() {
        let user = Uuid::new_v4();
        let rows = vec![
            event(user, EventType::Exam, day(23), 9),
            event(user, EventType::Class, day(16), 14),
            event(user, EventType::Class, day(16), 8),
            event(user, EventType::Other, day(15), 10),
            event(user, EventType::Activity, day(24), 10),
            event(Uuid::new_v4(), EventType::Exam, day(17), 10),
        ];

        let out = upcoming_events(&rows, user, day(16), 7).unwrap();
        let keys: Vec<(NaiveDate, u32)> = out
            .iter()
            .map(|e| (e.date, chrono::Timelike::hour(&e.time)))
            .collect();
        assert_eq!(keys, vec![(day(16), 8), (day(16), 14), (day(23), 9)]);

        let today_only = upcoming_events(&rows, user, day(16), 0).unwrap();
        assert_eq!(today_only.len(), 2);
    }

    #[test]
    fn window_past_last_date_is_rejected() {
        let user = Uuid::new_v4();
        let rows = vec![event(user, EventType::Exam, day(20), 9)];
        for days in [1_000_000_000, i64::MAX, -1] {
            let err = upcoming_events(&rows, user, day(16), days).unwrap_err();
            assert!(err.is_validation());
        }
    }

    #[test]
    fn event_counts_sorted() {
        let user = Uuid::new_v4();
        let rows = vec![
            event(user, EventType::Exam, day(20), 9),
            event(user, EventType::Class, day(21), 9),
            event(user, EventType::Class, day(22), 9),
            event(user, EventType::Activity, day(22), 9),
        ];
        assert_eq!(
            event_stats(&rows, user),
            vec![
                EventTypeCount {
                    event_type: EventType::Class,
                    count: 2
                },
                EventTypeCount {
                    event_type: EventType::Activity,
                    count: 1
                },
                EventTypeCount {
                    event_type: EventType::Exam,
                    count: 1
                },
            ]
        );
    }
}
