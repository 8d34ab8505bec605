//! Sitewright Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types - no business logic.

mod entities;
mod enums;
mod error;
mod identity;

pub use entities::{ConversationMessage, Project, User, Version};
pub use enums::{EntityType, MessageRole};
pub use error::{
    LlmError, SitewrightError, SitewrightResult, StorageError, ValidationError,
};
pub use identity::{
    new_entity_id, EntityId, MessageId, ProjectId, Timestamp, UserId, VersionId,
};
