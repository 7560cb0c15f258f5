//! Typed schema for the Orbit database
//!
//! Every table has three shapes:
//!
//! - a Row (`Profile`, `Transaction`, ...) exactly as persisted,
//! - an Insert shape with server-assigned fields optional,
//! - an Update shape where every field is optional and only supplied fields change.
//!
//! Nullable columns use `Option<Option<_>>` in Update shapes so that an absent
//! field and an explicit `null` are distinguishable.

mod enums;
mod profile;
mod schedule_event;
mod task;
mod transaction;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};

pub use enums::*;
pub use profile::*;
pub use schedule_event::*;
pub use task::*;
pub use transaction::*;

/// Boundary validation for Insert and Update shapes
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// An enumerated column and its allowed wire values
#[derive(Debug, Clone, Copy)]
pub struct EnumField {
    pub name: &'static str,
    pub allowed: &'static [&'static str],
}

/// A database table and its three shapes
pub trait Table: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Insert: Validate + Serialize + DeserializeOwned + Send + Sync;
    type Update: Validate + Serialize + DeserializeOwned + Default + Send + Sync;

    /// The name of this table
    fn table_name() -> &'static str;

    /// Fields an Insert payload must carry
    fn required_fields() -> &'static [&'static str];

    /// Closed-enumeration columns
    fn enum_fields() -> &'static [EnumField] {
        &[]
    }

    /// Columns that accept an explicit `null`
    fn nullable_fields() -> &'static [&'static str] {
        &[]
    }

    fn id(&self) -> Uuid;

    /// The profile that owns this row, `None` for profiles themselves
    fn owner(&self) -> Option<Uuid>;

    /// Build a row from a validated Insert, filling server defaults
    fn from_insert(insert: Self::Insert, now: DateTime<Utc>) -> Self;

    /// Apply a validated Update in place and refresh `updated_at`
    fn apply_update(&mut self, update: Self::Update, now: DateTime<Utc>) -> Result<()>;
}

/// Reject an Update whose `id` differs from the row it targets
pub(crate) fn check_immutable_id(table: &str, current: Uuid, requested: Option<Uuid>) -> Result<()> {
    match requested {
        Some(id) if id != current => Err(Error::ImmutableId {
            table: table.to_string(),
            id: current,
        }),
        _ => Ok(()),
    }
}

pub(crate) fn check_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Parse a raw JSON Insert payload, reporting missing fields and bad enum values by name
pub fn parse_insert<T: Table>(value: Value) -> Result<T::Insert> {
    parse_payload::<T, _>(T::required_fields(), value)
}

/// Parse a raw JSON Update payload
pub fn parse_update<T: Table>(value: Value) -> Result<T::Update> {
    parse_payload::<T, _>(&[], value)
}

fn parse_payload<T: Table, P: DeserializeOwned + Validate>(required: &[&str], value: Value) -> Result<P> {
    let table = T::table_name();
    let object = value
        .as_object()
        .ok_or_else(|| Error::validation(format!("{} payload must be a JSON object", table)))?;

    for field in required {
        match object.get(*field) {
            None | Some(Value::Null) => return Err(Error::missing_field(table, field)),
            Some(_) => {}
        }
    }

    // a present field must be a real value unless its column is nullable
    for (field, v) in object {
        if v.is_null() && !T::nullable_fields().contains(&field.as_str()) {
            return Err(Error::validation(format!(
                "{} on {} cannot be null",
                field, table
            )));
        }
    }

    for field in T::enum_fields() {
        match object.get(field.name) {
            None => {}
            Some(Value::String(s)) if field.allowed.contains(&s.as_str()) => {}
            Some(Value::String(s)) => return Err(Error::invalid_enum(field.name, s)),
            Some(other) => return Err(Error::invalid_enum(field.name, &other.to_string())),
        }
    }

    let payload: P = serde_json::from_value(value)
        .map_err(|e| Error::validation(format!("invalid {} payload: {}", table, e)))?;
    payload.validate()?;
    Ok(payload)
}

/// Wraps a present field in `Some`, so `null` becomes `Some(None)` in Update shapes
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Accepts RFC 3339, a naive `timestamp` (read as UTC) or a bare date (midnight UTC)
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = s.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    s.parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

pub(crate) fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn timestamps_in_several_forms() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2026-10-16T09:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-16T11:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-16T09:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2026-10-16"),
            Some(Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn transaction_insert_missing_field() {
        let payload = json!({
            "user_id": Uuid::new_v4(),
            "title": "Coffee",
            "type": "expense",
            "category": "Food"
        });
        match parse_insert::<Transaction>(payload) {
            Err(Error::MissingField { table, field }) => {
                assert_eq!(table, "transactions");
                assert_eq!(field, "amount");
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn transaction_insert_rejects_unknown_category() {
        let payload = json!({
            "user_id": Uuid::new_v4(),
            "title": "Weekly shop",
            "amount": 54.2,
            "type": "expense",
            "category": "Groceries"
        });
        let err = parse_insert::<Transaction>(payload).unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(err, Error::InvalidEnum { ref field, .. } if field == "category"));
    }

    #[test]
    fn update_rejects_bad_enum_and_non_object() {
        let err = parse_update::<Task>(json!({ "priority": "urgent" })).unwrap_err();
        assert!(matches!(err, Error::InvalidEnum { ref field, .. } if field == "priority"));

        let err = parse_update::<Task>(json!(["title"])).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let cleared: TaskUpdate = parse_update::<Task>(json!({ "description": null })).unwrap();
        assert_eq!(cleared.description, Some(None));

        let untouched: TaskUpdate = parse_update::<Task>(json!({ "completed": true })).unwrap();
        assert_eq!(untouched.description, None);
        assert_eq!(untouched.completed, Some(true));
    }

    #[test]
    fn null_only_clears_nullable_columns() {
        for payload in [
            json!({ "title": null }),
            json!({ "completed": null }),
            json!({ "user_id": null }),
        ] {
            let err = parse_update::<Task>(payload).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }

        let err = parse_update::<Transaction>(json!({ "amount": null })).unwrap_err();
        assert!(err.is_validation());
        let err = parse_update::<Profile>(json!({ "email": null })).unwrap_err();
        assert!(err.is_validation());

        let cleared = parse_update::<Profile>(json!({ "full_name": null, "avatar_url": null })).unwrap();
        assert_eq!(cleared.full_name, Some(None));
        assert_eq!(cleared.avatar_url, Some(None));
    }

    #[test]
    fn insert_rejects_null_on_defaulted_column() {
        let payload = json!({
            "user_id": Uuid::new_v4(),
            "title": "Read chapter 4",
            "priority": "low",
            "completed": null
        });
        assert!(parse_insert::<Task>(payload).unwrap_err().is_validation());
    }

    #[test]
    fn type_errors_are_validation_errors() {
        let payload = json!({
            "user_id": Uuid::new_v4(),
            "title": "Coffee",
            "amount": "three",
            "type": "expense",
            "category": "Food"
        });
        let err = parse_insert::<Transaction>(payload).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
