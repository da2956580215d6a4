//! Content store abstraction over the document repository.
//!
//! The portal treats a GitHub repository as its document store: directory
//! listings, file contents, revision tokens (blob SHAs) and commit history
//! all come from the Contents/Commits API. The trait exists so the HTTP
//! layer and tests can run against an in-memory store.

mod github;
pub mod types;

pub use github::GithubStore;
pub use types::{CommitInfo, FileNode, NodeKind};

use async_trait::async_trait;
use std::sync::Arc;

/// Errors from the content store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The revision token supplied with a write no longer matches the
    /// stored file. The caller must re-read and retry explicitly; the
    /// store never retries on its own.
    #[error("write conflict on {path}: stale revision")]
    Conflict { path: String },

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Read/write access to the document repository.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// List the entries of a directory. The repository root is `""`.
    async fn list_dir(&self, path: &str) -> Result<Vec<FileNode>, StoreError>;

    /// Fetch a file's content decoded to UTF-8 text.
    async fn file_content(&self, path: &str) -> Result<String, StoreError>;

    /// Fetch the current revision token (blob SHA) of a file.
    async fn file_sha(&self, path: &str) -> Result<String, StoreError>;

    /// Fetch the most recent commits touching `path`, newest first.
    /// An empty `path` means the whole repository.
    async fn history(&self, path: &str, limit: usize) -> Result<Vec<CommitInfo>, StoreError>;

    /// Overwrite an existing file. `sha` is the expected current revision;
    /// a stale value yields [`StoreError::Conflict`].
    async fn update_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: &str,
    ) -> Result<(), StoreError>;

    /// Create a new file. Fails if the path already exists.
    async fn create_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), StoreError>;
}

/// Shared store handle used by the HTTP layer.
pub type SharedStore = Arc<dyn ContentStore>;
