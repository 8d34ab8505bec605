//! Core entity structures

use crate::{MessageId, MessageRole, ProjectId, Timestamp, UserId, VersionId};
use serde::{Deserialize, Serialize};

/// User - credit balance holder.
///
/// Created and authenticated by the auth subsystem; this engine only reads
/// the record and moves its balance through the ledger operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    /// Metering balance. Never mutated directly - only through the ledger's
    /// atomic debit/credit operations, which keep it non-negative.
    pub credits: i64,
    pub created_at: Timestamp,
}

/// Project - a generated website evolving through revisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    /// The active rendered document. None until the first generation.
    pub current_code: Option<String>,
    /// Back-reference into the version history. None until the first
    /// generation, and cleared again by a direct save.
    pub current_version_id: Option<VersionId>,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Version - an immutable snapshot of a project's full code.
///
/// Exactly one per successful generation. Never mutated or deleted;
/// UUIDv7 ids make creation order the history order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub version_id: VersionId,
    pub project_id: ProjectId,
    pub code: String,
    pub description: String,
    pub created_at: Timestamp,
}

/// ConversationMessage - one entry in a project's append-only audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub message_id: MessageId,
    pub project_id: ProjectId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: Timestamp,
}
