//! The revision pipeline
//!
//! One revision attempt: validate, debit, log, enhance, generate, commit.
//! Credits are debited before the first provider call, so every exit path
//! after the debit that does not commit a Version refunds exactly once.
//! That guarantee is carried by [`RefundGuard`], which refunds on drop
//! unless it was disarmed by the commit.

use crate::fences::strip_code_fences;
use chrono::Utc;
use sitewright_core::{
    new_entity_id, ConversationMessage, EntityType, LlmError, MessageRole, Project, ProjectId,
    SitewrightError, SitewrightResult, StorageError, UserId, ValidationError, Version,
};
use sitewright_llm::GenerationProvider;
use sitewright_storage::{ProjectUpdate, Storage};

/// Fixed cost of one revision attempt, in credits.
pub const REVISION_COST: i64 = 5;

/// Description recorded on every generated version.
const VERSION_DESCRIPTION: &str = "changes made";

/// System instruction for the enhancement call.
const ENHANCE_SYSTEM_INSTRUCTION: &str = "You are a prompt enhancement specialist. \
The user wants to make changes to their website. Enhance their request to be more \
specific and actionable for a web developer.\n\n\
Enhance this by:\n\
1. Being specific about what elements to change\n\
2. Mentioning design details (colors, spacing, sizes)\n\
3. Clarifying the desired outcome\n\
4. Using clear technical terms\n\n\
Return ONLY the enhanced request, nothing else. Keep it concise (1-2 sentences).";

/// System instruction for the code-generation call.
const GENERATE_SYSTEM_INSTRUCTION: &str = "You are an expert web developer.\n\n\
CRITICAL REQUIREMENTS:\n\
- Return ONLY the complete updated HTML code with the requested changes.\n\
- Use Tailwind CSS for ALL styling (NO custom CSS).\n\
- Use Tailwind utility classes for all styling changes.\n\
- Include all JavaScript in <script> tags before closing </body>\n\
- Make sure it's a complete, standalone HTML document with Tailwind CSS\n\
- Return the HTML Code Only, nothing else\n\n\
Apply the requested changes while maintaining the Tailwind CSS styling approach.";

/// Result of a successful revision.
#[derive(Debug, Clone)]
pub struct RevisionOutcome {
    /// The newly committed version
    pub version: Version,
    /// Normalized generated code (same as `version.code`)
    pub code: String,
    /// The user's balance after the debit
    pub balance: i64,
}

/// Scoped compensation for a debited revision attempt.
///
/// Armed on construction (immediately after the debit succeeds) and
/// disarmed just before the success return, so provider failures, storage
/// failures, early returns, and panics all take the credit-back path
/// exactly once. A refund that itself fails is a double fault: it is
/// surfaced to operator logs and not retried.
struct RefundGuard<'a> {
    storage: &'a dyn Storage,
    user_id: UserId,
    amount: i64,
    armed: bool,
}

impl<'a> RefundGuard<'a> {
    fn new(storage: &'a dyn Storage, user_id: UserId, amount: i64) -> Self {
        Self {
            storage,
            user_id,
            amount,
            armed: true,
        }
    }

    /// Cancel the refund; called once the new version is committed.
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RefundGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.storage.credits_credit(self.user_id, self.amount) {
            Ok(balance) => {
                tracing::info!(
                    user_id = %self.user_id,
                    amount = self.amount,
                    balance,
                    "refunded failed revision attempt"
                );
            }
            Err(error) => {
                tracing::error!(
                    user_id = %self.user_id,
                    amount = self.amount,
                    %error,
                    "refund of failed revision attempt did not apply"
                );
            }
        }
    }
}

fn append_message(
    storage: &dyn Storage,
    project_id: ProjectId,
    role: MessageRole,
    content: impl Into<String>,
) -> SitewrightResult<()> {
    storage.message_insert(&ConversationMessage {
        message_id: new_entity_id(),
        project_id,
        role,
        content: content.into(),
        created_at: Utc::now(),
    })
}

/// Best-effort failure notice for the conversation log. The caller is
/// already on an error path, so a storage error here is logged rather
/// than allowed to mask the original failure.
fn note_generation_failure(storage: &dyn Storage, project_id: ProjectId) {
    if let Err(error) = append_message(
        storage,
        project_id,
        MessageRole::Assistant,
        "Unable to generate the code, please try again",
    ) {
        tracing::error!(
            %project_id,
            %error,
            "failure notice did not reach the conversation log"
        );
    }
}

/// Load a project owned by `user_id`, reporting plain `NotFound` on a
/// missing project and on an ownership mismatch alike.
pub(crate) fn load_owned_project(
    storage: &dyn Storage,
    user_id: UserId,
    project_id: ProjectId,
) -> SitewrightResult<Project> {
    let project = storage.project_get(project_id)?.ok_or(SitewrightError::Storage(
        StorageError::NotFound {
            entity_type: EntityType::Project,
            id: project_id,
        },
    ))?;
    if project.user_id != user_id {
        return Err(SitewrightError::Storage(StorageError::NotFound {
            entity_type: EntityType::Project,
            id: project_id,
        }));
    }
    Ok(project)
}

/// Submit a revision request against a project.
///
/// Debits [`REVISION_COST`] credits, expands the request through the
/// provider's enhancement call, generates the new document, and commits it
/// as a new immutable [`Version`] that becomes the project's current code.
/// Attempts that fail after the debit are refunded exactly once; the
/// conversation log retains the attempt either way.
pub async fn submit_revision(
    storage: &dyn Storage,
    provider: &dyn GenerationProvider,
    user_id: UserId,
    project_id: ProjectId,
    message: &str,
) -> SitewrightResult<RevisionOutcome> {
    // Pre-debit checks: rejected requests must leave no trace anywhere.
    let user = storage.user_get(user_id)?.ok_or(SitewrightError::Storage(
        StorageError::NotFound {
            entity_type: EntityType::User,
            id: user_id,
        },
    ))?;
    if user.credits < REVISION_COST {
        return Err(SitewrightError::Storage(StorageError::InsufficientCredits {
            user_id,
            balance: user.credits,
            required: REVISION_COST,
        }));
    }
    let message = message.trim();
    if message.is_empty() {
        return Err(SitewrightError::Validation(
            ValidationError::RequiredFieldMissing {
                field: "message".to_string(),
            },
        ));
    }
    let project = load_owned_project(storage, user_id, project_id)?;

    append_message(storage, project_id, MessageRole::User, message)?;

    let balance = storage.credits_debit(user_id, REVISION_COST)?;
    let mut refund = RefundGuard::new(storage, user_id, REVISION_COST);

    let enhanced_prompt = match provider.enhance(ENHANCE_SYSTEM_INSTRUCTION, message).await {
        Ok(prompt) => prompt,
        Err(error) => {
            note_generation_failure(storage, project_id);
            return Err(error);
        }
    };

    append_message(
        storage,
        project_id,
        MessageRole::Assistant,
        format!("I have enhanced your prompt to: {}", enhanced_prompt),
    )?;
    append_message(
        storage,
        project_id,
        MessageRole::Assistant,
        "Now making changes to your website...",
    )?;

    let context_code = project.current_code.as_deref().unwrap_or("");
    let raw = match provider
        .generate(GENERATE_SYSTEM_INSTRUCTION, context_code, &enhanced_prompt)
        .await
    {
        Ok(raw) => raw,
        Err(error) => {
            note_generation_failure(storage, project_id);
            return Err(error);
        }
    };

    let code = strip_code_fences(&raw);
    if code.is_empty() {
        note_generation_failure(storage, project_id);
        tracing::warn!(%user_id, %project_id, "generation returned an empty document");
        return Err(SitewrightError::Llm(
            LlmError::EmptyCompletion,
        ));
    }

    let version = Version {
        version_id: new_entity_id(),
        project_id,
        code: code.clone(),
        description: VERSION_DESCRIPTION.to_string(),
        created_at: Utc::now(),
    };
    storage.version_insert(&version)?;

    append_message(
        storage,
        project_id,
        MessageRole::Assistant,
        "I have made the changes to your website! You can now preview it",
    )?;

    storage.project_update(
        project_id,
        ProjectUpdate {
            current_code: Some(code.clone()),
            current_version_id: Some(Some(version.version_id)),
            ..Default::default()
        },
    )?;

    refund.disarm();
    tracing::info!(
        %user_id,
        %project_id,
        version_id = %version.version_id,
        "revision committed"
    );

    Ok(RevisionOutcome {
        version,
        code,
        balance,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sitewright_storage::MemoryStorage;
    use sitewright_test_utils::{seed_project, seed_user, FailingProvider, ScriptedProvider};

    #[tokio::test]
    async fn test_successful_revision_commits_version_and_log() {
        let storage = MemoryStorage::new();
        let user = seed_user(&storage, 5);
        let project = seed_project(&storage, user.user_id);
        let provider = ScriptedProvider::new(
            "Change the header background to blue.",
            "```html\n<p>hi</p>\n```",
        );

        let outcome = submit_revision(
            &storage,
            &provider,
            user.user_id,
            project.project_id,
            "make it blue",
        )
        .await
        .unwrap();

        assert_eq!(outcome.code, "<p>hi</p>");
        assert_eq!(outcome.balance, 0);
        assert_eq!(outcome.version.description, "changes made");

        // Balance spent, version committed, pointer moved
        assert_eq!(storage.user_get(user.user_id).unwrap().unwrap().credits, 0);
        let history = storage.version_list_by_project(project.project_id).unwrap();
        assert_eq!(history.len(), 1);
        let loaded = storage.project_get(project.project_id).unwrap().unwrap();
        assert_eq!(loaded.current_version_id, Some(outcome.version.version_id));
        assert_eq!(loaded.current_code.as_deref(), Some("<p>hi</p>"));

        // Four log entries: request, enhancement notice, progress, success
        let log = storage.message_list_by_project(project.project_id).unwrap();
        assert_eq!(log.len(), 4);
        assert_eq!(log[0].role, MessageRole::User);
        assert_eq!(log[0].content, "make it blue");
        assert!(log[1].content.starts_with("I have enhanced your prompt to:"));
        assert_eq!(log[2].content, "Now making changes to your website...");
        assert!(log[3].content.contains("made the changes"));
    }

    #[tokio::test]
    async fn test_insufficient_credits_has_no_side_effects() {
        let storage = MemoryStorage::new();
        let user = seed_user(&storage, 3);
        let project = seed_project(&storage, user.user_id);
        let provider = ScriptedProvider::new("unused", "unused");

        let err = submit_revision(
            &storage,
            &provider,
            user.user_id,
            project.project_id,
            "make it blue",
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            SitewrightError::Storage(StorageError::InsufficientCredits { balance: 3, .. })
        ));
        assert_eq!(storage.user_get(user.user_id).unwrap().unwrap().credits, 3);
        assert_eq!(storage.version_count(), 0);
        assert_eq!(storage.message_count(), 0);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_before_debit() {
        let storage = MemoryStorage::new();
        let user = seed_user(&storage, 10);
        let project = seed_project(&storage, user.user_id);
        let provider = ScriptedProvider::new("unused", "unused");

        let err = submit_revision(&storage, &provider, user.user_id, project.project_id, "   ")
            .await
            .unwrap_err();

        assert!(matches!(err, SitewrightError::Validation(_)));
        assert_eq!(storage.user_get(user.user_id).unwrap().unwrap().credits, 10);
        assert_eq!(storage.message_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_project_is_rejected_before_debit() {
        let storage = MemoryStorage::new();
        let user = seed_user(&storage, 10);
        let provider = ScriptedProvider::new("unused", "unused");

        let err = submit_revision(&storage, &provider, user.user_id, new_entity_id(), "hi")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SitewrightError::Storage(StorageError::NotFound { .. })
        ));
        assert_eq!(storage.user_get(user.user_id).unwrap().unwrap().credits, 10);
    }

    #[tokio::test]
    async fn test_project_of_another_user_reads_as_not_found() {
        let storage = MemoryStorage::new();
        let owner = seed_user(&storage, 10);
        let caller = seed_user(&storage, 10);
        let project = seed_project(&storage, owner.user_id);
        let provider = ScriptedProvider::new("unused", "unused");

        let err = submit_revision(&storage, &provider, caller.user_id, project.project_id, "hi")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SitewrightError::Storage(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_provider_failure_refunds_exactly_once() {
        let storage = MemoryStorage::new();
        let user = seed_user(&storage, 10);
        let project = seed_project(&storage, user.user_id);
        let provider = FailingProvider::on_generate();

        let err = submit_revision(
            &storage,
            &provider,
            user.user_id,
            project.project_id,
            "make it blue",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SitewrightError::Llm(_)));
        // Net balance unchanged: debit then credit-back cancel exactly
        assert_eq!(storage.user_get(user.user_id).unwrap().unwrap().credits, 10);
        assert_eq!(storage.version_count(), 0);
        // Request, enhancement notice, progress notice, then the failure
        // notice appended on the error path
        let log = storage.message_list_by_project(project.project_id).unwrap();
        assert_eq!(log.len(), 4);
        assert_eq!(log[3].role, MessageRole::Assistant);
        assert!(log[3].content.contains("Unable to generate"));
    }

    #[tokio::test]
    async fn test_enhance_failure_refunds_and_keeps_request_in_log() {
        let storage = MemoryStorage::new();
        let user = seed_user(&storage, 10);
        let project = seed_project(&storage, user.user_id);
        let provider = FailingProvider::on_enhance();

        let err = submit_revision(
            &storage,
            &provider,
            user.user_id,
            project.project_id,
            "make it blue",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SitewrightError::Llm(_)));
        assert_eq!(storage.user_get(user.user_id).unwrap().unwrap().credits, 10);
        let log = storage.message_list_by_project(project.project_id).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].role, MessageRole::User);
        assert!(log[1].content.contains("Unable to generate"));
    }

    #[tokio::test]
    async fn test_empty_generation_refunds_and_logs_failure_notice() {
        let storage = MemoryStorage::new();
        let user = seed_user(&storage, 10);
        let project = seed_project(&storage, user.user_id);
        // Whitespace-and-fence output normalizes to empty
        let provider = ScriptedProvider::new("instruction", "```html\n```");

        let err = submit_revision(
            &storage,
            &provider,
            user.user_id,
            project.project_id,
            "make it blue",
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            SitewrightError::Llm(LlmError::EmptyCompletion)
        ));
        assert_eq!(storage.user_get(user.user_id).unwrap().unwrap().credits, 10);
        assert_eq!(storage.version_count(), 0);
        // Project untouched
        let loaded = storage.project_get(project.project_id).unwrap().unwrap();
        assert_eq!(loaded.current_version_id, None);

        let log = storage.message_list_by_project(project.project_id).unwrap();
        assert_eq!(log.len(), 4);
        assert!(log[3].content.contains("Unable to generate"));
    }

    #[tokio::test]
    async fn test_second_revision_passes_current_code_as_context() {
        let storage = MemoryStorage::new();
        let user = seed_user(&storage, 10);
        let project = seed_project(&storage, user.user_id);

        let first = ScriptedProvider::new("instruction", "<p>v1</p>");
        submit_revision(&storage, &first, user.user_id, project.project_id, "one")
            .await
            .unwrap();

        let second = ScriptedProvider::new("instruction", "<p>v2</p>");
        submit_revision(&storage, &second, user.user_id, project.project_id, "two")
            .await
            .unwrap();

        assert_eq!(second.last_context().as_deref(), Some("<p>v1</p>"));
        assert_eq!(
            storage
                .version_list_by_project(project.project_id)
                .unwrap()
                .len(),
            2
        );
    }
}
