//! Git integration: the diff a review runs against

mod diff_source;

pub use diff_source::{GitDiffSource, GitError};
