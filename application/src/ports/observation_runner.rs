//! Observation runner port
//!
//! Executes the observation requests a model made during its review.

use async_trait::async_trait;
use codequorum_domain::{ObservationRequest, ObservationResults};
use std::path::Path;

/// Executes observation requests against a repository
///
/// Never fails as a whole: every request yields a JSON value under its name,
/// which is an `{"error": ...}` object when that one request failed.
#[async_trait]
pub trait ObservationPort: Send + Sync {
    async fn run_observations(
        &self,
        requests: &[ObservationRequest],
        repo_path: &Path,
    ) -> ObservationResults;
}

/// Observation port for when no repository is available
pub struct NoObservations;

#[async_trait]
impl ObservationPort for NoObservations {
    async fn run_observations(
        &self,
        _requests: &[ObservationRequest],
        _repo_path: &Path,
    ) -> ObservationResults {
        ObservationResults::new()
    }
}
