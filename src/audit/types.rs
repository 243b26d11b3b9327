//! Audit event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::items::types::iso8601;
use crate::items::Item;

/// Action tag carried by an audit event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// An item was created.
    CreateItem,
    /// Items were listed.
    ListItems,
}

/// Notification body sent to the audit collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// What happened.
    pub action: AuditAction,
    /// Action-specific fields.
    pub details: Value,
    /// When the event was built, immediately before sending.
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    /// Build an event stamped with the current time.
    pub fn new(action: AuditAction, details: Value) -> Self {
        Self {
            action,
            details,
            timestamp: Utc::now(),
        }
    }

    /// `CREATE_ITEM` with `{item_id, name}`.
    pub fn item_created(item: &Item) -> Self {
        Self::new(
            AuditAction::CreateItem,
            json!({
                "item_id": item.id.to_string(),
                "name": item.name,
            }),
        )
    }

    /// `LIST_ITEMS` with `{count}`.
    pub fn items_listed(count: usize) -> Self {
        Self::new(AuditAction::ListItems, json!({ "count": count }))
    }
}
