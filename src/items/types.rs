//! Item types and request payload parsing.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ValidationError;

/// A persisted item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Item {
    /// Unique identifier, assigned at creation.
    #[schema(value_type = String)]
    pub id: Uuid,
    /// Caller-supplied name, never empty.
    pub name: String,
    /// Optional description, empty when not supplied.
    pub description: String,
    /// Creation time in UTC.
    #[serde(with = "iso8601")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Build a new item from a validated payload.
    ///
    /// `created_at` is truncated to microseconds, the precision of a
    /// `TIMESTAMPTZ` column, so the created and listed values agree.
    pub fn create(new: NewItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}

/// Validated input for creating an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Item name.
    pub name: String,
    /// Item description.
    pub description: String,
}

impl NewItem {
    /// Parse and validate a raw `POST /items` body.
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|_| ValidationError::NameRequired)?;

        let Value::Object(mut fields) = value else {
            return Err(ValidationError::NameRequired);
        };

        let name = match fields.remove("name") {
            Some(Value::String(name)) if !name.is_empty() => name,
            _ => return Err(ValidationError::NameRequired),
        };

        let description = match fields.remove("description") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(description)) => description,
            Some(_) => return Err(ValidationError::DescriptionNotString),
        };

        Ok(Self { name, description })
    }
}

/// `POST /items` request body, as documented in the OpenAPI schema.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    /// Item name.
    pub name: String,
    /// Item description.
    #[serde(default)]
    pub description: Option<String>,
}

/// ISO-8601 timestamps with microseconds and an explicit `+00:00` offset.
pub mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Render a timestamp. The fraction is omitted on whole seconds.
    pub fn format(value: &DateTime<Utc>) -> String {
        let precision = if value.timestamp_subsec_micros() == 0 {
            SecondsFormat::Secs
        } else {
            SecondsFormat::Micros
        };
        value.to_rfc3339_opts(precision, false)
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
