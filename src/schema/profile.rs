//! `profiles` table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check_immutable_id, check_not_blank, deserialize_some, Table, Validate};
use crate::error::Result;

/// Public profile of an authenticated user. `id` is the auth identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInsert {
    pub id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileInsert {
    pub fn new(id: Uuid, email: &str) -> Self {
        Self {
            id,
            email: email.to_string(),
            full_name: None,
            avatar_url: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_full_name(mut self, full_name: &str) -> Self {
        self.full_name = Some(full_name.to_string());
        self
    }

    pub fn with_avatar_url(mut self, avatar_url: &str) -> Self {
        self.avatar_url = Some(avatar_url.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub full_name: Option<Option<String>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_some"
    )]
    pub avatar_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Validate for ProfileInsert {
    fn validate(&self) -> Result<()> {
        check_not_blank("email", &self.email)
    }
}

impl Validate for ProfileUpdate {
    fn validate(&self) -> Result<()> {
        match &self.email {
            Some(email) => check_not_blank("email", email),
            None => Ok(()),
        }
    }
}

impl Table for Profile {
    type Insert = ProfileInsert;
    type Update = ProfileUpdate;

    fn table_name() -> &'static str {
        "profiles"
    }

    fn required_fields() -> &'static [&'static str] {
        &["id", "email"]
    }

    fn nullable_fields() -> &'static [&'static str] {
        &["full_name", "avatar_url"]
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> Option<Uuid> {
        None
    }

    fn from_insert(insert: ProfileInsert, now: DateTime<Utc>) -> Self {
        Self {
            id: insert.id,
            email: insert.email,
            full_name: insert.full_name,
            avatar_url: insert.avatar_url,
            created_at: insert.created_at.unwrap_or(now),
            updated_at: insert.updated_at.unwrap_or(now),
        }
    }

    fn apply_update(&mut self, update: ProfileUpdate, now: DateTime<Utc>) -> Result<()> {
        check_immutable_id(Self::table_name(), self.id, update.id)?;
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(full_name) = update.full_name {
            self.full_name = full_name;
        }
        if let Some(avatar_url) = update.avatar_url {
            self.avatar_url = avatar_url;
        }
        if let Some(created_at) = update.created_at {
            self.created_at = created_at;
        }
        self.updated_at = now;
        Ok(())
    }
}
