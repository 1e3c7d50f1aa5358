//! Diff source port
//!
//! Provides the unified diff a review runs against.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while obtaining a diff
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffSourceError {
    #[error("Git diff failed: {0}")]
    Failed(String),

    #[error("Version control tool unavailable: {0}")]
    Unavailable(String),
}

/// Source of unified diffs
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Diff of `reference` against `base`, or of staged changes when
    /// `reference` is `None`.
    async fn diff(
        &self,
        reference: Option<&str>,
        base: Option<&str>,
    ) -> Result<String, DiffSourceError>;
}
