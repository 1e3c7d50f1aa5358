//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod review_loop;
pub mod run_review;
