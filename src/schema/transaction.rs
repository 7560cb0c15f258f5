//! `transactions` table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    check_immutable_id, check_not_blank, deserialize_optional_timestamp, deserialize_some,
    deserialize_timestamp, Category, EnumField, Table, TransactionType, Validate,
};
use crate::error::{Error, Result};

/// A money movement owned by one user.
///
/// `amount` is a non-negative magnitude; `kind` says whether it adds to or
/// subtracts from the balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount with the sign implied by `kind`
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInsert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    /// Defaults to the insert time
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TransactionInsert {
    pub fn new(
        user_id: Uuid,
        title: &str,
        amount: f64,
        kind: TransactionType,
        category: Category,
    ) -> Self {
        Self {
            id: None,
            user_id,
            title: title.to_string(),
            description: None,
            amount,
            kind,
            category,
            date: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Largest amount a single transaction may carry. Keeps per-user sums finite.
pub const MAX_AMOUNT: f64 = 1e15;

fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || !(0.0..=MAX_AMOUNT).contains(&amount) {
        return Err(Error::validation(format!(
            "amount must be between 0 and {}, got {}",
            MAX_AMOUNT, amount
        )));
    }
    Ok(())
}

impl Validate for TransactionInsert {
    fn validate(&self) -> Result<()> {
        check_not_blank("title", &self.title)?;
        check_amount(self.amount)
    }
}

impl Validate for TransactionUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            check_not_blank("title", title)?;
        }
        if let Some(amount) = self.amount {
            check_amount(amount)?;
        }
        Ok(())
    }
}

const ENUM_FIELDS: &[EnumField] = &[
    EnumField {
        name: "type",
        allowed: TransactionType::NAMES,
    },
    EnumField {
        name: "category",
        allowed: Category::NAMES,
    },
];

impl Table for Transaction {
    type Insert = TransactionInsert;
    type Update = TransactionUpdate;

    fn table_name() -> &'static str {
        "transactions"
    }

    fn required_fields() -> &'static [&'static str] {
        &["user_id", "title", "amount", "type", "category"]
    }

    fn nullable_fields() -> &'static [&'static str] {
        &["description"]
    }

    fn enum_fields() -> &'static [EnumField] {
        ENUM_FIELDS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> Option<Uuid> {
        Some(self.user_id)
    }

    fn from_insert(insert: TransactionInsert, now: DateTime<Utc>) -> Self {
        Self {
            id: insert.id.unwrap_or_else(Uuid::new_v4),
            user_id: insert.user_id,
            title: insert.title,
            description: insert.description,
            amount: insert.amount,
            kind: insert.kind,
            category: insert.category,
            date: insert.date.unwrap_or(now),
            created_at: insert.created_at.unwrap_or(now),
            updated_at: insert.updated_at.unwrap_or(now),
        }
    }

    fn apply_update(&mut self, update: TransactionUpdate, now: DateTime<Utc>) -> Result<()> {
        check_immutable_id(Self::table_name(), self.id, update.id)?;
        if let Some(user_id) = update.user_id {
            self.user_id = user_id;
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(created_at) = update.created_at {
            self.created_at = created_at;
        }
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn insert_fills_defaults() {
        let user = Uuid::new_v4();
        let insert = TransactionInsert::new(user, "Bus pass", 30.0, TransactionType::Expense, Category::Transport);
        let row = Transaction::from_insert(insert, now());

        assert_eq!(row.user_id, user);
        assert_eq!(row.title, "Bus pass");
        assert_eq!(row.description, None);
        assert_eq!(row.date, now());
        assert_eq!(row.created_at, now());
        assert_eq!(row.updated_at, now());
    }

    #[test]
    fn insert_serializes_without_server_fields() {
        let insert = TransactionInsert::new(Uuid::nil(), "Pay", 100.0, TransactionType::Income, Category::Salary);
        let value = serde_json::to_value(&insert).unwrap();
        assert_eq!(
            value,
            json!({
                "user_id": Uuid::nil(),
                "title": "Pay",
                "amount": 100.0,
                "type": "income",
                "category": "Salary"
            })
        );
    }

    #[test]
    fn rejects_negative_and_non_finite_amounts() {
        let insert = TransactionInsert::new(Uuid::nil(), "Refund", -5.0, TransactionType::Income, Category::Other);
        assert!(insert.validate().is_err());

        let update = TransactionUpdate {
            amount: Some(f64::NAN),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let huge = TransactionInsert::new(Uuid::nil(), "Lottery", f64::MAX, TransactionType::Income, Category::Other);
        assert!(huge.validate().unwrap_err().is_validation());

        let at_cap = TransactionInsert::new(Uuid::nil(), "Lottery", MAX_AMOUNT, TransactionType::Income, Category::Other);
        assert!(at_cap.validate().is_ok());
    }

    #[test]
    fn update_changes_only_supplied_fields() {
        let insert = TransactionInsert::new(Uuid::new_v4(), "Dinner", 40.0, TransactionType::Expense, Category::Food)
            .with_description("with friends");
        let mut row = Transaction::from_insert(insert, now());
        let before = row.clone();
        let later = now() + chrono::Duration::hours(1);

        let update = TransactionUpdate {
            amount: Some(45.5),
            ..Default::default()
        };
        row.apply_update(update, later).unwrap();

        assert_eq!(row.amount, 45.5);
        assert_eq!(row.description, before.description);
        assert_eq!(row.id, before.id);
        assert_eq!(row.created_at, before.created_at);
        assert_eq!(row.updated_at, later);
    }

    #[test]
    fn update_cannot_change_id() {
        let insert = TransactionInsert::new(Uuid::new_v4(), "Dinner", 40.0, TransactionType::Expense, Category::Food);
        let mut row = Transaction::from_insert(insert, now());
        let same = TransactionUpdate {
            id: Some(row.id),
            ..Default::default()
        };
        assert!(row.apply_update(same, now()).is_ok());

        let other = TransactionUpdate {
            id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(matches!(
            row.apply_update(other, now()),
            Err(Error::ImmutableId { .. })
        ));
    }

    #[test]
    fn signed_amount_follows_kind() {
        let row = Transaction::from_insert(
            TransactionInsert::new(Uuid::nil(), "Rent", 900.0, TransactionType::Expense, Category::Bills),
            now(),
        );
        assert_eq!(row.signed_amount(), -900.0);
    }
}
