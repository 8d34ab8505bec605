//! Identity types for Sitewright entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Identifier of a user (owned by the auth subsystem, referenced here).
pub type UserId = Uuid;

/// Identifier of a website project.
pub type ProjectId = Uuid;

/// Identifier of an immutable code version.
pub type VersionId = Uuid;

/// Identifier of a conversation message.
pub type MessageId = Uuid;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}
