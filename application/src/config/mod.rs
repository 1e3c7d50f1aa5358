//! Application-level configuration.
//!
//! - [`ReviewParams`]: review loop control (observation budget, timeout, repository)

pub mod review_params;

pub use review_params::ReviewParams;
