//! Sitewright Storage - Storage Trait and In-Memory Implementation
//!
//! Defines the storage abstraction layer for Sitewright entities. The
//! persistent engine is an external collaborator; everything the revision
//! engine needs is expressed through the [`Storage`] trait, and
//! [`MemoryStorage`] provides the in-process implementation used by the
//! server and by tests.
//!
//! Two interface-level guarantees matter here:
//!
//! - The credit ledger operations are atomic. `credits_debit` is a
//!   conditional decrement (floor check and write under one lock section),
//!   never a read-then-write pair, so concurrent debits cannot lose updates
//!   or drive a balance negative.
//! - Versions and conversation messages are append-only: the trait exposes
//!   insert and query operations for them, no update and no delete.

use sitewright_core::{
    ConversationMessage, EntityType, MessageId, Project, ProjectId, SitewrightError,
    SitewrightResult, StorageError, User, UserId, Version, VersionId,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Update payload for projects.
///
/// Outer `Option` means "leave the field untouched". For
/// `current_version_id` the inner `Option` distinguishes pointing the
/// project at a version (`Some(Some(id))`) from detaching it from version
/// history (`Some(None)`), which is what a direct save does.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    /// New active code
    pub current_code: Option<String>,
    /// New version pointer (set or clear)
    pub current_version_id: Option<Option<VersionId>>,
    /// Publish flag
    pub is_published: Option<bool>,
}

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Storage trait for Sitewright entities.
///
/// Implementations provide persistence for users, projects, versions, and
/// conversation messages, plus the atomic credit ledger.
pub trait Storage: Send + Sync {
    // === User / Ledger Operations ===

    /// Insert a new user.
    fn user_insert(&self, u: &User) -> SitewrightResult<()>;

    /// Get a user by ID.
    fn user_get(&self, id: UserId) -> SitewrightResult<Option<User>>;

    /// Atomically decrement a user's balance, failing with
    /// `InsufficientCredits` when the balance is below `amount`.
    /// Returns the new balance.
    fn credits_debit(&self, user_id: UserId, amount: i64) -> SitewrightResult<i64>;

    /// Atomically increment a user's balance. Used both for refunds and for
    /// purchase deposits from the payment collaborator. Returns the new
    /// balance.
    fn credits_credit(&self, user_id: UserId, amount: i64) -> SitewrightResult<i64>;

    // === Project Operations ===

    /// Insert a new project.
    fn project_insert(&self, p: &Project) -> SitewrightResult<()>;

    /// Get a project by ID.
    fn project_get(&self, id: ProjectId) -> SitewrightResult<Option<Project>>;

    /// Update a project.
    fn project_update(&self, id: ProjectId, update: ProjectUpdate) -> SitewrightResult<()>;

    /// List all published projects.
    fn project_list_published(&self) -> SitewrightResult<Vec<Project>>;

    // === Version Operations (append-only) ===

    /// Insert a new version.
    fn version_insert(&self, v: &Version) -> SitewrightResult<()>;

    /// Get a version by ID.
    fn version_get(&self, id: VersionId) -> SitewrightResult<Option<Version>>;

    /// List a project's versions in creation order.
    fn version_list_by_project(&self, project_id: ProjectId) -> SitewrightResult<Vec<Version>>;

    // === Conversation Operations (append-only) ===

    /// Append a conversation message.
    fn message_insert(&self, m: &ConversationMessage) -> SitewrightResult<()>;

    /// List a project's conversation in creation order.
    fn message_list_by_project(
        &self,
        project_id: ProjectId,
    ) -> SitewrightResult<Vec<ConversationMessage>>;
}

// ============================================================================
// IN-MEMORY STORAGE
// ============================================================================

/// In-memory storage backed by per-entity hash maps.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    projects: Arc<RwLock<HashMap<ProjectId, Project>>>,
    versions: Arc<RwLock<HashMap<VersionId, Version>>>,
    messages: Arc<RwLock<HashMap<MessageId, ConversationMessage>>>,
}

fn read_guard<T>(lock: &RwLock<T>) -> SitewrightResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| SitewrightError::Storage(StorageError::LockPoisoned))
}

fn write_guard<T>(lock: &RwLock<T>) -> SitewrightResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| SitewrightError::Storage(StorageError::LockPoisoned))
}

impl MemoryStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        if let Ok(mut users) = self.users.write() {
            users.clear();
        }
        if let Ok(mut projects) = self.projects.write() {
            projects.clear();
        }
        if let Ok(mut versions) = self.versions.write() {
            versions.clear();
        }
        if let Ok(mut messages) = self.messages.write() {
            messages.clear();
        }
    }

    /// Get count of stored versions.
    pub fn version_count(&self) -> usize {
        self.versions.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Get count of stored conversation messages.
    pub fn message_count(&self) -> usize {
        self.messages.read().map(|m| m.len()).unwrap_or(0)
    }
}

impl Storage for MemoryStorage {
    // === User / Ledger Operations ===

    fn user_insert(&self, u: &User) -> SitewrightResult<()> {
        let mut users = write_guard(&self.users)?;
        if users.contains_key(&u.user_id) {
            return Err(SitewrightError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::User,
                reason: "already exists".to_string(),
            }));
        }
        users.insert(u.user_id, u.clone());
        Ok(())
    }

    fn user_get(&self, id: UserId) -> SitewrightResult<Option<User>> {
        let users = read_guard(&self.users)?;
        Ok(users.get(&id).cloned())
    }

    fn credits_debit(&self, user_id: UserId, amount: i64) -> SitewrightResult<i64> {
        // Floor check and decrement under a single write lock: the
        // conditional-update equivalent of "decrement if balance >= amount".
        let mut users = write_guard(&self.users)?;
        let user = users
            .get_mut(&user_id)
            .ok_or(SitewrightError::Storage(StorageError::NotFound {
                entity_type: EntityType::User,
                id: user_id,
            }))?;

        if user.credits < amount {
            return Err(SitewrightError::Storage(StorageError::InsufficientCredits {
                user_id,
                balance: user.credits,
                required: amount,
            }));
        }
        user.credits -= amount;
        Ok(user.credits)
    }

    fn credits_credit(&self, user_id: UserId, amount: i64) -> SitewrightResult<i64> {
        let mut users = write_guard(&self.users)?;
        let user = users
            .get_mut(&user_id)
            .ok_or(SitewrightError::Storage(StorageError::NotFound {
                entity_type: EntityType::User,
                id: user_id,
            }))?;
        user.credits += amount;
        Ok(user.credits)
    }

    // === Project Operations ===

    fn project_insert(&self, p: &Project) -> SitewrightResult<()> {
        let mut projects = write_guard(&self.projects)?;
        if projects.contains_key(&p.project_id) {
            return Err(SitewrightError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Project,
                reason: "already exists".to_string(),
            }));
        }
        projects.insert(p.project_id, p.clone());
        Ok(())
    }

    fn project_get(&self, id: ProjectId) -> SitewrightResult<Option<Project>> {
        let projects = read_guard(&self.projects)?;
        Ok(projects.get(&id).cloned())
    }

    fn project_update(&self, id: ProjectId, update: ProjectUpdate) -> SitewrightResult<()> {
        let mut projects = write_guard(&self.projects)?;
        let project = projects
            .get_mut(&id)
            .ok_or(SitewrightError::Storage(StorageError::NotFound {
                entity_type: EntityType::Project,
                id,
            }))?;

        if let Some(code) = update.current_code {
            project.current_code = Some(code);
        }
        if let Some(version_id) = update.current_version_id {
            project.current_version_id = version_id;
        }
        if let Some(is_published) = update.is_published {
            project.is_published = is_published;
        }
        project.updated_at = chrono::Utc::now();

        Ok(())
    }

    fn project_list_published(&self) -> SitewrightResult<Vec<Project>> {
        let projects = read_guard(&self.projects)?;
        let mut published: Vec<Project> = projects
            .values()
            .filter(|p| p.is_published)
            .cloned()
            .collect();
        published.sort_by_key(|p| p.project_id);
        Ok(published)
    }

    // === Version Operations ===

    fn version_insert(&self, v: &Version) -> SitewrightResult<()> {
        let mut versions = write_guard(&self.versions)?;
        if versions.contains_key(&v.version_id) {
            return Err(SitewrightError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Version,
                reason: "already exists".to_string(),
            }));
        }
        versions.insert(v.version_id, v.clone());
        Ok(())
    }

    fn version_get(&self, id: VersionId) -> SitewrightResult<Option<Version>> {
        let versions = read_guard(&self.versions)?;
        Ok(versions.get(&id).cloned())
    }

    fn version_list_by_project(&self, project_id: ProjectId) -> SitewrightResult<Vec<Version>> {
        let versions = read_guard(&self.versions)?;
        let mut history: Vec<Version> = versions
            .values()
            .filter(|v| v.project_id == project_id)
            .cloned()
            .collect();
        // UUIDv7 ids sort by creation time
        history.sort_by_key(|v| v.version_id);
        Ok(history)
    }

    // === Conversation Operations ===

    fn message_insert(&self, m: &ConversationMessage) -> SitewrightResult<()> {
        let mut messages = write_guard(&self.messages)?;
        if messages.contains_key(&m.message_id) {
            return Err(SitewrightError::Storage(StorageError::InsertFailed {
                entity_type: EntityType::Message,
                reason: "already exists".to_string(),
            }));
        }
        messages.insert(m.message_id, m.clone());
        Ok(())
    }

    fn message_list_by_project(
        &self,
        project_id: ProjectId,
    ) -> SitewrightResult<Vec<ConversationMessage>> {
        let messages = read_guard(&self.messages)?;
        let mut log: Vec<ConversationMessage> = messages
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        log.sort_by_key(|m| m.message_id);
        Ok(log)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sitewright_core::{new_entity_id, MessageRole};

    fn sample_user(credits: i64) -> User {
        User {
            user_id: new_entity_id(),
            credits,
            created_at: Utc::now(),
        }
    }

    fn sample_project(user_id: UserId) -> Project {
        let now = Utc::now();
        Project {
            project_id: new_entity_id(),
            user_id,
            name: "portfolio".to_string(),
            current_code: None,
            current_version_id: None,
            is_published: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_version(project_id: ProjectId, code: &str) -> Version {
        Version {
            version_id: new_entity_id(),
            project_id,
            code: code.to_string(),
            description: "changes made".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_debit_decrements_and_returns_balance() {
        let storage = MemoryStorage::new();
        let user = sample_user(10);
        storage.user_insert(&user).unwrap();

        let balance = storage.credits_debit(user.user_id, 5).unwrap();
        assert_eq!(balance, 5);
        assert_eq!(storage.user_get(user.user_id).unwrap().unwrap().credits, 5);
    }

    #[test]
    fn test_debit_rejects_below_floor_without_mutation() {
        let storage = MemoryStorage::new();
        let user = sample_user(3);
        storage.user_insert(&user).unwrap();

        let err = storage.credits_debit(user.user_id, 5).unwrap_err();
        assert!(matches!(
            err,
            SitewrightError::Storage(StorageError::InsufficientCredits {
                balance: 3,
                required: 5,
                ..
            })
        ));
        assert_eq!(storage.user_get(user.user_id).unwrap().unwrap().credits, 3);
    }

    #[test]
    fn test_credit_increments_unconditionally() {
        let storage = MemoryStorage::new();
        let user = sample_user(0);
        storage.user_insert(&user).unwrap();

        assert_eq!(storage.credits_credit(user.user_id, 5).unwrap(), 5);
        assert_eq!(storage.credits_credit(user.user_id, 5).unwrap(), 10);
    }

    #[test]
    fn test_ledger_ops_on_missing_user_fail_not_found() {
        let storage = MemoryStorage::new();
        let id = new_entity_id();
        assert!(matches!(
            storage.credits_debit(id, 5).unwrap_err(),
            SitewrightError::Storage(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            storage.credits_credit(id, 5).unwrap_err(),
            SitewrightError::Storage(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_concurrent_debits_never_go_negative() {
        let storage = Arc::new(MemoryStorage::new());
        let user = sample_user(25);
        storage.user_insert(&user).unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let storage = Arc::clone(&storage);
                let user_id = user.user_id;
                std::thread::spawn(move || storage.credits_debit(user_id, 5).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();

        // 25 credits fund exactly 5 debits of 5
        assert_eq!(successes, 5);
        assert_eq!(storage.user_get(user.user_id).unwrap().unwrap().credits, 0);
    }

    #[test]
    fn test_project_update_sets_and_clears_version_pointer() {
        let storage = MemoryStorage::new();
        let user = sample_user(0);
        let project = sample_project(user.user_id);
        storage.project_insert(&project).unwrap();

        let version_id = new_entity_id();
        storage
            .project_update(
                project.project_id,
                ProjectUpdate {
                    current_code: Some("<p>hi</p>".to_string()),
                    current_version_id: Some(Some(version_id)),
                    ..Default::default()
                },
            )
            .unwrap();

        let loaded = storage.project_get(project.project_id).unwrap().unwrap();
        assert_eq!(loaded.current_version_id, Some(version_id));
        assert_eq!(loaded.current_code.as_deref(), Some("<p>hi</p>"));

        // Inner None detaches the pointer without touching the code
        storage
            .project_update(
                project.project_id,
                ProjectUpdate {
                    current_version_id: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        let loaded = storage.project_get(project.project_id).unwrap().unwrap();
        assert_eq!(loaded.current_version_id, None);
        assert_eq!(loaded.current_code.as_deref(), Some("<p>hi</p>"));
    }

    #[test]
    fn test_version_history_comes_back_in_creation_order() {
        let storage = MemoryStorage::new();
        let project_id = new_entity_id();

        let v1 = sample_version(project_id, "one");
        let v2 = sample_version(project_id, "two");
        let v3 = sample_version(project_id, "three");
        storage.version_insert(&v1).unwrap();
        storage.version_insert(&v2).unwrap();
        storage.version_insert(&v3).unwrap();
        // A version of another project must not leak in
        storage
            .version_insert(&sample_version(new_entity_id(), "other"))
            .unwrap();

        let history = storage.version_list_by_project(project_id).unwrap();
        let codes: Vec<&str> = history.iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_duplicate_version_insert_fails() {
        let storage = MemoryStorage::new();
        let v = sample_version(new_entity_id(), "code");
        storage.version_insert(&v).unwrap();
        assert!(matches!(
            storage.version_insert(&v).unwrap_err(),
            SitewrightError::Storage(StorageError::InsertFailed { .. })
        ));
    }

    #[test]
    fn test_conversation_is_scoped_and_ordered() {
        let storage = MemoryStorage::new();
        let project_id = new_entity_id();

        for (role, content) in [
            (MessageRole::User, "make it blue"),
            (MessageRole::Assistant, "working on it"),
        ] {
            storage
                .message_insert(&ConversationMessage {
                    message_id: new_entity_id(),
                    project_id,
                    role,
                    content: content.to_string(),
                    created_at: Utc::now(),
                })
                .unwrap();
        }

        let log = storage.message_list_by_project(project_id).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].role, MessageRole::User);
        assert_eq!(log[1].role, MessageRole::Assistant);
        assert!(storage
            .message_list_by_project(new_entity_id())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_list_published_filters_unpublished() {
        let storage = MemoryStorage::new();
        let user = sample_user(0);
        let mut published = sample_project(user.user_id);
        published.is_published = true;
        let hidden = sample_project(user.user_id);
        storage.project_insert(&published).unwrap();
        storage.project_insert(&hidden).unwrap();

        let listed = storage.project_list_published().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].project_id, published.project_id);
    }
}
