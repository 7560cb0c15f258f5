//! `schedule_events` table

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    check_immutable_id, check_not_blank, deserialize_some, EnumField, EventType, Table, Validate,
};
use crate::error::Result;

/// A calendar entry: a date plus a wall-clock time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEventInsert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ScheduleEventInsert {
    pub fn new(user_id: Uuid, title: &str, kind: EventType, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            id: None,
            user_id,
            title: title.to_string(),
            description: None,
            kind,
            date,
            time,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleEventUpdate {
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
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Validate for ScheduleEventInsert {
    fn validate(&self) -> Result<()> {
        check_not_blank("title", &self.title)
    }
}

impl Validate for ScheduleEventUpdate {
    fn validate(&self) -> Result<()> {
        match &self.title {
            Some(title) => check_not_blank("title", title),
            None => Ok(()),
        }
    }
}

const ENUM_FIELDS: &[EnumField] = &[EnumField {
    name: "type",
    allowed: EventType::NAMES,
}];

impl Table for ScheduleEvent {
    type Insert = ScheduleEventInsert;
    type Update = ScheduleEventUpdate;

    fn table_name() -> &'static str {
        "schedule_events"
    }

    fn required_fields() -> &'static [&'static str] {
        &["user_id", "title", "type", "date", "time"]
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

    fn from_insert(insert: ScheduleEventInsert, now: DateTime<Utc>) -> Self {
        Self {
            id: insert.id.unwrap_or_else(Uuid::new_v4),
            user_id: insert.user_id,
            title: insert.title,
            description: insert.description,
            kind: insert.kind,
            date: insert.date,
            time: insert.time,
            created_at: insert.created_at.unwrap_or(now),
            updated_at: insert.updated_at.unwrap_or(now),
        }
    }

    fn apply_update(&mut self, update: ScheduleEventUpdate, now: DateTime<Utc>) -> Result<()> {
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
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(time) = update.time {
            self.time = time;
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
    use serde_json::json;

    #[test]
    fn row_uses_wire_formats() {
        let value = json!({
            "id": "6f1c0b9e-8d8e-4a8a-9c55-0d6a1f4c2b10",
            "user_id": "0b7f6a0e-3c1d-4b8e-a1f2-9e8d7c6b5a40",
            "title": "Algebra midterm",
            "description": null,
            "type": "exam",
            "date": "2026-10-20",
            "time": "09:00:00",
            "created_at": "2026-10-01T08:00:00+00:00",
            "updated_at": "2026-10-01T08:00:00+00:00"
        });
        let row: ScheduleEvent = serde_json::from_value(value).unwrap();
        assert_eq!(row.kind, EventType::Exam);
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
        assert_eq!(row.time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        let back = serde_json::to_value(&row).unwrap();
        assert_eq!(back["date"], "2026-10-20");
        assert_eq!(back["time"], "09:00:00");
        assert_eq!(back["type"], "exam");
    }

    #[test]
    fn update_moves_event() {
        let now = Utc::now();
        let mut row = ScheduleEvent::from_insert(
            ScheduleEventInsert::new(
                Uuid::new_v4(),
                "Lab",
                EventType::Class,
                NaiveDate::from_ymd_opt(2026, 10, 21).unwrap(),
                NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            ),
            now,
        );
        let update = ScheduleEventUpdate {
            time: NaiveTime::from_hms_opt(15, 30, 0),
            ..Default::default()
        };
        row.apply_update(update, now).unwrap();
        assert_eq!(row.time, NaiveTime::from_hms_opt(15, 30, 0).unwrap());
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2026, 10, 21).unwrap());
        assert_eq!(row.kind, EventType::Class);
    }
}
