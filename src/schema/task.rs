//! `tasks` table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    check_immutable_id, check_not_blank, deserialize_some, EnumField, Priority, Table, Validate,
};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInsert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    /// Defaults to `false`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskInsert {
    pub fn new(user_id: Uuid, title: &str, priority: Priority) -> Self {
        Self {
            id: None,
            user_id,
            title: title.to_string(),
            description: None,
            priority,
            completed: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskUpdate {
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
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskUpdate {
    /// Update that only flips the completion flag
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }
}

impl Validate for TaskInsert {
    fn validate(&self) -> Result<()> {
        check_not_blank("title", &self.title)
    }
}

impl Validate for TaskUpdate {
    fn validate(&self) -> Result<()> {
        match &self.title {
            Some(title) => check_not_blank("title", title),
            None => Ok(()),
        }
    }
}

const ENUM_FIELDS: &[EnumField] = &[EnumField {
    name: "priority",
    allowed: Priority::NAMES,
}];

impl Table for Task {
    type Insert = TaskInsert;
    type Update = TaskUpdate;

    fn table_name() -> &'static str {
        "tasks"
    }

    fn required_fields() -> &'static [&'static str] {
        &["user_id", "title", "priority"]
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

    fn from_insert(insert: TaskInsert, now: DateTime<Utc>) -> Self {
        Self {
            id: insert.id.unwrap_or_else(Uuid::new_v4),
            user_id: insert.user_id,
            title: insert.title,
            description: insert.description,
            priority: insert.priority,
            completed: insert.completed.unwrap_or(false),
            created_at: insert.created_at.unwrap_or(now),
            updated_at: insert.updated_at.unwrap_or(now),
        }
    }

    fn apply_update(&mut self, update: TaskUpdate, now: DateTime<Utc>) -> Result<()> {
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
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
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

    #[test]
    fn insert_with_title_and_priority_only() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap();
        let row = Task::from_insert(TaskInsert::new(Uuid::new_v4(), "Read chapter 3", Priority::High), now);

        assert!(!row.completed);
        assert_eq!(row.description, None);
        assert_eq!(row.created_at, now);
        assert_eq!(row.updated_at, now);
    }

    #[test]
    fn clearing_description_with_null() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap();
        let mut row = Task::from_insert(
            TaskInsert::new(Uuid::new_v4(), "Laundry", Priority::Low).with_description("darks"),
            now,
        );
        let update = TaskUpdate {
            description: Some(None),
            ..Default::default()
        };
        row.apply_update(update, now).unwrap();
        assert_eq!(row.description, None);
        assert_eq!(row.title, "Laundry");
    }

    #[test]
    fn update_serializes_explicit_null() {
        let update = TaskUpdate {
            description: Some(None),
            completed: Some(true),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "description": null, "completed": true })
        );
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(TaskInsert::new(Uuid::nil(), "  ", Priority::Low).validate().is_err());
        assert!(TaskUpdate::completed(true).validate().is_ok());
    }
}
