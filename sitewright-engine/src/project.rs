//! Project operations outside the revision pipeline
//!
//! Rollback repoints a project at an existing stored version; direct save
//! overwrites the active code outside of version history; the read queries
//! back the preview and gallery surfaces.

use crate::revision::load_owned_project;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sitewright_core::{
    new_entity_id, ConversationMessage, EntityType, MessageRole, Project, ProjectId,
    SitewrightError, SitewrightResult, StorageError, UserId, ValidationError, Version, VersionId,
};
use sitewright_storage::{ProjectUpdate, Storage};

/// A project together with its version history and conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectPreview {
    pub project: Project,
    pub versions: Vec<Version>,
    pub conversation: Vec<ConversationMessage>,
}

/// Roll a project back to a previously stored version.
///
/// The target version must belong to the project; a version id from another
/// project reads as `NotFound` and mutates nothing. No credits are charged
/// and no new version is created - rollback repoints, it does not duplicate
/// history.
pub fn rollback(
    storage: &dyn Storage,
    user_id: UserId,
    project_id: ProjectId,
    version_id: VersionId,
) -> SitewrightResult<Project> {
    let mut project = load_owned_project(storage, user_id, project_id)?;

    let version = storage
        .version_get(version_id)?
        .filter(|v| v.project_id == project_id)
        .ok_or(SitewrightError::Storage(StorageError::NotFound {
            entity_type: EntityType::Version,
            id: version_id,
        }))?;

    storage.project_update(
        project_id,
        ProjectUpdate {
            current_code: Some(version.code.clone()),
            current_version_id: Some(Some(version.version_id)),
            ..Default::default()
        },
    )?;

    storage.message_insert(&ConversationMessage {
        message_id: new_entity_id(),
        project_id,
        role: MessageRole::Assistant,
        content: "I have rolled back your website to selected version. You can now preview it"
            .to_string(),
        created_at: Utc::now(),
    })?;

    tracing::info!(%user_id, %project_id, %version_id, "project rolled back");

    // Mirror the applied update on the row we already hold instead of
    // reading it back.
    project.current_code = Some(version.code);
    project.current_version_id = Some(version.version_id);
    project.updated_at = Utc::now();
    Ok(project)
}

/// Overwrite a project's active code directly.
///
/// Clears `current_version_id`: a manual edit is deliberately untracked by
/// version history and by the conversation log.
pub fn save_code(
    storage: &dyn Storage,
    user_id: UserId,
    project_id: ProjectId,
    code: &str,
) -> SitewrightResult<()> {
    if code.trim().is_empty() {
        return Err(SitewrightError::Validation(
            ValidationError::RequiredFieldMissing {
                field: "code".to_string(),
            },
        ));
    }
    load_owned_project(storage, user_id, project_id)?;

    storage.project_update(
        project_id,
        ProjectUpdate {
            current_code: Some(code.to_string()),
            current_version_id: Some(None),
            ..Default::default()
        },
    )
}

/// Load a project with its history and conversation (owner only).
pub fn project_preview(
    storage: &dyn Storage,
    user_id: UserId,
    project_id: ProjectId,
) -> SitewrightResult<ProjectPreview> {
    let project = load_owned_project(storage, user_id, project_id)?;
    let versions = storage.version_list_by_project(project_id)?;
    let conversation = storage.message_list_by_project(project_id)?;
    Ok(ProjectPreview {
        project,
        versions,
        conversation,
    })
}

/// The active code of a published project, for the public gallery.
///
/// Unpublished or code-less projects read as `NotFound`.
pub fn published_code(storage: &dyn Storage, project_id: ProjectId) -> SitewrightResult<String> {
    let not_found = || {
        SitewrightError::Storage(StorageError::NotFound {
            entity_type: EntityType::Project,
            id: project_id,
        })
    };
    let project = storage.project_get(project_id)?.ok_or_else(not_found)?;
    if !project.is_published {
        return Err(not_found());
    }
    project.current_code.ok_or_else(not_found)
}

// =============================================================================
// TESTS
// =============================================================================
