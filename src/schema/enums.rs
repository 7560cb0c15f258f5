//! Closed enumerations used by the schema
//!
//! Wire values are the exact, case-sensitive strings the database stores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Direction of a money transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];
    pub const NAMES: &'static [&'static str] = &["income", "expense"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

/// Spending / income category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Bills,
    Salary,
    Shopping,
    Entertainment,
    Health,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Bills,
        Category::Salary,
        Category::Shopping,
        Category::Entertainment,
        Category::Health,
        Category::Other,
    ];
    pub const NAMES: &'static [&'static str] = &[
        "Food",
        "Transport",
        "Bills",
        "Salary",
        "Shopping",
        "Entertainment",
        "Health",
        "Other",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Bills => "Bills",
            Category::Salary => "Salary",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Other => "Other",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];
    pub const NAMES: &'static [&'static str] = &["low", "medium", "high"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Kind of schedule event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Activity,
    Exam,
    Class,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Activity,
        EventType::Exam,
        EventType::Class,
        EventType::Other,
    ];
    pub const NAMES: &'static [&'static str] = &["activity", "exam", "class", "other"];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Activity => "activity",
            EventType::Exam => "exam",
            EventType::Class => "class",
            EventType::Other => "other",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::invalid_enum("type", s))
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::invalid_enum("category", s))
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::invalid_enum("priority", s))
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::invalid_enum("type", s))
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_variants() {
        for (v, name) in Category::ALL.iter().zip(Category::NAMES) {
            assert_eq!(v.as_str(), *name);
            assert_eq!(serde_json::to_value(v).unwrap(), serde_json::json!(name));
        }
        for (v, name) in TransactionType::ALL.iter().zip(TransactionType::NAMES) {
            assert_eq!(v.as_str(), *name);
        }
        for (v, name) in Priority::ALL.iter().zip(Priority::NAMES) {
            assert_eq!(v.as_str(), *name);
        }
        for (v, name) in EventType::ALL.iter().zip(EventType::NAMES) {
            assert_eq!(v.as_str(), *name);
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert_eq!("Food".parse::<Category>().unwrap(), Category::Food);
        assert!("food".parse::<Category>().is_err());
        assert!("High".parse::<Priority>().is_err());
        assert_eq!("exam".parse::<EventType>().unwrap(), EventType::Exam);
    }

    #[test]
    fn unknown_value_names_the_field() {
        match "Groceries".parse::<Category>() {
            Err(Error::InvalidEnum { field, value }) => {
                assert_eq!(field, "category");
                assert_eq!(value, "Groceries");
            }
            other => panic!("expected InvalidEnum, got {:?}", other),
        }
    }
}
