//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown {kind} label: '{value}'")]
    InvalidLabel { kind: &'static str, value: String },
}
