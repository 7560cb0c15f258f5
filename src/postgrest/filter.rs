//! Filter operations shared by the PostgREST builders and the in-memory backend

use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::cmp::Ordering;

/// Operator for filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to
    Eq,

    /// Not equal to
    Neq,

    /// Greater than
    Gt,

    /// Greater than or equal to
    Gte,

    /// Less than
    Lt,

    /// Less than or equal to
    Lte,

    /// In a list of values
    In,

    /// Is (`null`, `true` or `false`)
    Is,
}

impl FilterOperator {
    /// Convert the operator to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::In => "in",
            FilterOperator::Is => "is",
        }
    }
}

/// A single `column=op.value` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl Condition {
    /// Value in PostgREST query-string form
    pub fn to_param(&self) -> String {
        format!("{}.{}", self.operator.as_str(), self.value)
    }

    fn matches(&self, row: &Value) -> bool {
        let field = row.get(&self.column).unwrap_or(&Value::Null);
        match self.operator {
            FilterOperator::Eq => compare_text(field, &self.value) == Some(Ordering::Equal),
            FilterOperator::Neq => matches!(
                compare_text(field, &self.value),
                Some(Ordering::Less) | Some(Ordering::Greater)
            ),
            FilterOperator::Gt => compare_text(field, &self.value) == Some(Ordering::Greater),
            FilterOperator::Gte => matches!(
                compare_text(field, &self.value),
                Some(Ordering::Greater) | Some(Ordering::Equal)
            ),
            FilterOperator::Lt => compare_text(field, &self.value) == Some(Ordering::Less),
            FilterOperator::Lte => matches!(
                compare_text(field, &self.value),
                Some(Ordering::Less) | Some(Ordering::Equal)
            ),
            FilterOperator::In => self
                .value
                .trim_start_matches('(')
                .trim_end_matches(')')
                .split(',')
                .any(|candidate| compare_text(field, candidate.trim()) == Some(Ordering::Equal)),
            FilterOperator::Is => match self.value.as_str() {
                "null" => field.is_null(),
                "true" => field.as_bool() == Some(true),
                "false" => field.as_bool() == Some(false),
                _ => false,
            },
        }
    }
}

/// Row filter with ordering and limit, used for `select`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
    order: Vec<(String, bool)>,
    limit: Option<usize>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push<T: ToString>(mut self, column: &str, operator: FilterOperator, value: T) -> Self {
        self.conditions.push(Condition {
            column: column.to_string(),
            operator,
            value: value.to_string(),
        });
        self
    }

    /// Filter rows where column equals a value
    pub fn eq<T: ToString>(self, column: &str, value: T) -> Self {
        self.push(column, FilterOperator::Eq, value)
    }

    /// Filter rows where column does not equal a value
    pub fn neq<T: ToString>(self, column: &str, value: T) -> Self {
        self.push(column, FilterOperator::Neq, value)
    }

    /// Filter rows where column is greater than a value
    pub fn gt<T: ToString>(self, column: &str, value: T) -> Self {
        self.push(column, FilterOperator::Gt, value)
    }

    /// Filter rows where column is greater than or equal to a value
    pub fn gte<T: ToString>(self, column: &str, value: T) -> Self {
        self.push(column, FilterOperator::Gte, value)
    }

    /// Filter rows where column is less than a value
    pub fn lt<T: ToString>(self, column: &str, value: T) -> Self {
        self.push(column, FilterOperator::Lt, value)
    }

    /// Filter rows where column is less than or equal to a value
    pub fn lte<T: ToString>(self, column: &str, value: T) -> Self {
        self.push(column, FilterOperator::Lte, value)
    }

    /// Filter rows where column is in a list of values
    pub fn in_list<T: ToString>(self, column: &str, values: &[T]) -> Self {
        let values_str: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let list = format!("({})", values_str.join(","));
        self.push(column, FilterOperator::In, list)
    }

    /// Filter rows where column is null
    pub fn is_null(self, column: &str) -> Self {
        self.push(column, FilterOperator::Is, "null")
    }

    /// Filter rows where a boolean column has the given value
    pub fn is(self, column: &str, value: bool) -> Self {
        self.push(column, FilterOperator::Is, value)
    }

    /// Order the results by a column. Can be called more than once.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_string(), ascending));
        self
    }

    /// Limit the number of rows returned
    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Query-string pairs in PostgREST syntax
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .conditions
            .iter()
            .map(|c| (c.column.clone(), c.to_param()))
            .collect();

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(column, ascending)| {
                    format!("{}.{}", column, if *ascending { "asc" } else { "desc" })
                })
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }

    /// Whether a JSON row satisfies every condition
    pub fn matches(&self, row: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }

    /// Filter, order and truncate a set of JSON rows
    pub fn apply(&self, rows: Vec<Value>) -> Vec<Value> {
        let mut rows: Vec<Value> = rows.into_iter().filter(|row| self.matches(row)).collect();

        if !self.order.is_empty() {
            rows.sort_by(|a, b| {
                for (column, ascending) in &self.order {
                    let left = a.get(column).unwrap_or(&Value::Null);
                    let right = b.get(column).unwrap_or(&Value::Null);
                    let ordering = compare_values(left, right);
                    // nulls sort last in either direction
                    let ordering = match (left.is_null(), right.is_null(), *ascending) {
                        (false, false, false) => ordering.reverse(),
                        _ => ordering,
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }

        rows
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

/// Compare a JSON field with a filter value given as text
fn compare_text(field: &Value, value: &str) -> Option<Ordering> {
    match field {
        Value::Null => None,
        Value::Bool(b) => value.parse::<bool>().ok().map(|v| b.cmp(&v)),
        Value::Number(n) => {
            let v = value.parse::<f64>().ok()?;
            n.as_f64()?.partial_cmp(&v)
        }
        Value::String(s) => match (parse_timestamp(s), parse_timestamp(value)) {
            (Some(left), Some(right)) => Some(left.cmp(&right)),
            _ => Some(s.as_str().cmp(value)),
        },
        _ => None,
    }
}

/// Total order over JSON scalars for sorting; nulls go last
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => match (parse_timestamp(x), parse_timestamp(y)) {
            (Some(left), Some(right)) => left.cmp(&right),
            _ => x.cmp(y),
        },
        _ => Ordering::Equal,
    }
}
