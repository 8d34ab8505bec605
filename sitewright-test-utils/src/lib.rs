//! Sitewright Test Utilities
//!
//! Centralized test infrastructure for the Sitewright workspace:
//! - Mock generation providers (scripted and failing)
//! - Storage seeding fixtures for common scenarios

// Re-export the in-memory storage for convenience
pub use sitewright_storage::MemoryStorage;

use async_trait::async_trait;
use chrono::Utc;
use sitewright_core::{
    new_entity_id, LlmError, Project, ProjectId, SitewrightError, SitewrightResult, User, UserId,
    Version,
};
use sitewright_llm::GenerationProvider;
use sitewright_storage::Storage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// MOCK PROVIDERS
// ============================================================================

/// Generation provider that replays fixed responses and records its inputs.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    enhanced: String,
    generated: String,
    calls: AtomicUsize,
    last_context: Mutex<Option<String>>,
    last_instruction: Mutex<Option<String>>,
}

impl ScriptedProvider {
    /// Create a provider returning `enhanced` from enhance calls and
    /// `generated` from generate calls.
    pub fn new(enhanced: impl Into<String>, generated: impl Into<String>) -> Self {
        Self {
            enhanced: enhanced.into(),
            generated: generated.into(),
            ..Default::default()
        }
    }

    /// Total provider calls made (enhance + generate).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The context code passed to the most recent generate call.
    pub fn last_context(&self) -> Option<String> {
        self.last_context.lock().unwrap().clone()
    }

    /// The instruction passed to the most recent generate call.
    pub fn last_instruction(&self) -> Option<String> {
        self.last_instruction.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn enhance(
        &self,
        _system_instruction: &str,
        _user_message: &str,
    ) -> SitewrightResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.enhanced.clone())
    }

    async fn generate(
        &self,
        _system_instruction: &str,
        context_code: &str,
        instruction: &str,
    ) -> SitewrightResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock().unwrap() = Some(context_code.to_string());
        *self.last_instruction.lock().unwrap() = Some(instruction.to_string());
        Ok(self.generated.clone())
    }
}

/// Generation provider that fails a chosen call with a transport error.
#[derive(Debug, Clone, Copy)]
pub struct FailingProvider {
    fail_enhance: bool,
}

impl FailingProvider {
    /// Fail the enhancement call.
    pub fn on_enhance() -> Self {
        Self { fail_enhance: true }
    }

    /// Succeed enhancement, fail the generation call.
    pub fn on_generate() -> Self {
        Self {
            fail_enhance: false,
        }
    }

    fn transport_error() -> SitewrightError {
        SitewrightError::Llm(LlmError::RequestFailed {
            provider: "mock".to_string(),
            status: 503,
            message: "connection reset".to_string(),
        })
    }
}

#[async_trait]
impl GenerationProvider for FailingProvider {
    async fn enhance(
        &self,
        _system_instruction: &str,
        _user_message: &str,
    ) -> SitewrightResult<String> {
        if self.fail_enhance {
            return Err(Self::transport_error());
        }
        Ok("mock instruction".to_string())
    }

    async fn generate(
        &self,
        _system_instruction: &str,
        _context_code: &str,
        _instruction: &str,
    ) -> SitewrightResult<String> {
        Err(Self::transport_error())
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Insert a user with the given balance.
pub fn seed_user(storage: &dyn Storage, credits: i64) -> User {
    let user = User {
        user_id: new_entity_id(),
        credits,
        created_at: Utc::now(),
    };
    storage.user_insert(&user).expect("seed user");
    user
}

/// Insert a fresh project owned by `user_id`, with no code yet.
pub fn seed_project(storage: &dyn Storage, user_id: UserId) -> Project {
    let now = Utc::now();
    let project = Project {
        project_id: new_entity_id(),
        user_id,
        name: "test project".to_string(),
        current_code: None,
        current_version_id: None,
        is_published: false,
        created_at: now,
        updated_at: now,
    };
    storage.project_insert(&project).expect("seed project");
    project
}

/// Insert a stored version of `project_id` with the given code.
pub fn seed_version(storage: &dyn Storage, project_id: ProjectId, code: &str) -> Version {
    let version = Version {
        version_id: new_entity_id(),
        project_id,
        code: code.to_string(),
        description: "changes made".to_string(),
        created_at: Utc::now(),
    };
    storage.version_insert(&version).expect("seed version");
    version
}
