//! Sitewright Engine - Revision & Versioning
//!
//! The orchestration layer between storage and the generation provider:
//! turning a chat-style edit request into a new retained code version
//! (with transactional credit accounting around the attempt), rolling a
//! project back to a stored version, and direct code saves.

mod fences;
mod project;
mod revision;

pub use fences::strip_code_fences;
pub use project::{
    project_preview, published_code, rollback, save_code, ProjectPreview,
};
pub use revision::{submit_revision, RevisionOutcome, REVISION_COST};
