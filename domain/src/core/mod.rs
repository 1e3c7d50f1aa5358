//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`string::clip`]: character-safe truncation

pub mod error;
pub mod string;
