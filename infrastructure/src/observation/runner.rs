//! Local observation runner: the concrete [`ObservationPort`].
//!
//! ```text
//! run_observations(requests)
//!   ├─ resolve each request      → error result on bad tool / params
//!   ├─ JoinSet: one task per tool call, each bounded by the timeout
//!   └─ results keyed by request name, later duplicates win
//! ```

use super::{coverage, dependencies, exception_hierarchy, git_blame, python_ast, search};
use async_trait::async_trait;
use codequorum_application::ports::observation_runner::ObservationPort;
use codequorum_domain::{ObservationError, ObservationKind, ObservationRequest, ObservationResults};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Default timeout for one observation
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runs observation tools against a local checkout
#[derive(Debug, Clone)]
pub struct LocalObservationRunner {
    timeout: Duration,
}

impl Default for LocalObservationRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl LocalObservationRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run one resolved observation. Failures become `{"error": ...}` results.
    pub async fn execute(&self, kind: &ObservationKind, repo_path: &Path) -> Value {
        self.bounded(kind, dispatch(kind, repo_path)).await
    }

    async fn bounded(
        &self,
        kind: &ObservationKind,
        work: impl Future<Output = Result<Value, ObservationError>>,
    ) -> Value {
        let context = Some(kind.error_context());

        match tokio::time::timeout(self.timeout, work).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                debug!("Observation {} failed: {}", kind.tool_name(), e);
                e.to_result(context)
            }
            Err(_) => {
                warn!(
                    "Observation {} timed out after {:?}",
                    kind.tool_name(),
                    self.timeout
                );
                ObservationError::Timeout {
                    tool: kind.tool_name().to_string(),
                    secs: self.timeout.as_secs(),
                }
                .to_result(context)
            }
        }
    }
}

async fn dispatch(kind: &ObservationKind, repo_path: &Path) -> Result<Value, ObservationError> {
    match kind {
        ObservationKind::ExceptionHierarchy(p) => {
            exception_hierarchy::exception_hierarchy(p, repo_path).await
        }
        ObservationKind::RaisesAnalysis(p) => python_ast::raises_analysis(p).await,
        ObservationKind::CallGraph(p) => python_ast::call_graph(p).await,
        ObservationKind::FindUsages(p) => search::find_usages(p).await,
        ObservationKind::GitBlame(p) => git_blame::git_blame(p).await,
        ObservationKind::TestCoverage(p) => coverage::test_coverage(p).await,
        ObservationKind::CoverageMapTests(p) => coverage::coverage_map_tests(p).await,
        ObservationKind::CoverageMapFiles(p) => coverage::coverage_map_files(p).await,
        ObservationKind::FileImports(p) => python_ast::file_imports(p).await,
        ObservationKind::ProjectDependencies(p) => dependencies::project_dependencies(p).await,
    }
}

#[async_trait]
impl ObservationPort for LocalObservationRunner {
    async fn run_observations(
        &self,
        requests: &[ObservationRequest],
        repo_path: &Path,
    ) -> ObservationResults {
        let mut slots: Vec<Option<Value>> = vec![None; requests.len()];
        let mut join_set = JoinSet::new();

        for (index, request) in requests.iter().enumerate() {
            match request.resolve(repo_path) {
                Ok(kind) => {
                    let this = self.clone();
                    let repo: PathBuf = repo_path.to_path_buf();
                    join_set.spawn(async move { (index, this.execute(&kind, &repo).await) });
                }
                Err(e) => {
                    debug!("Observation {} rejected: {}", request.name, e);
                    slots[index] = Some(e.to_result(None));
                }
            }
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, value)) => slots[index] = Some(value),
                Err(e) => warn!("Observation task join error: {}", e),
            }
        }

        requests
            .iter()
            .zip(slots)
            .map(|(request, slot)| {
                let value =
                    slot.unwrap_or_else(|| json!({"error": "observation task aborted"}));
                (request.name.clone(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use std::fs;
    use std::time::Instant;

    fn request(name: &str, tool: Option<&str>, params: Value) -> ObservationRequest {
        let mut value = json!({"name": name, "params": params});
        if let Some(tool) = tool {
            value["tool"] = json!(tool);
        }
        ObservationRequest::from_value(&value).unwrap()
    }

    #[tokio::test]
    async fn test_runs_each_request_under_its_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("requirements.txt"), "httpx\n").unwrap();
        fs::write(
            dir.path().join("app.py"),
            "import os\n\ndef main():\n    os.getcwd()\n",
        )
        .unwrap();

        let requests = vec![
            request("deps", Some("project_dependencies"), json!({})),
            request(
                "graph",
                Some("call_graph"),
                json!({"file_path": "app.py", "function_name": "main"}),
            ),
            request("nothing", None, json!({})),
            request("bogus", Some("grep"), json!({})),
            request("bad_params", Some("call_graph"), json!({"file_path": "app.py"})),
        ];

        let results = LocalObservationRunner::default()
            .run_observations(&requests, dir.path())
            .await;

        assert_eq!(results.len(), 5);
        assert_eq!(results["deps"]["requirements_txt"], "httpx\n");
        assert_eq!(
            results["graph"]["calls"],
            json!([{"name": "os.getcwd", "line": 4}])
        );
        assert_eq!(results["nothing"], json!({"error": "No tool specified"}));
        assert_eq!(results["bogus"], json!({"error": "Unknown tool: grep"}));
        assert_eq!(results["bad_params"]["params_received"], json!(["file_path"]));
        assert!(
            results["bad_params"]["error"]
                .as_str()
                .unwrap()
                .starts_with("Parameter error:")
        );
    }

    #[tokio::test]
    async fn test_tool_failure_carries_context() {
        let dir = tempfile::tempdir().unwrap();
        let requests = vec![request(
            "imports",
            Some("file_imports"),
            json!({"file_path": "missing.py"}),
        )];

        let results = LocalObservationRunner::default()
            .run_observations(&requests, dir.path())
            .await;

        assert_eq!(results["imports"]["file"], "missing.py");
        assert!(results["imports"]["error"].is_string());
    }

    #[tokio::test]
    async fn test_later_duplicate_name_wins() {
        let dir = tempfile::tempdir().unwrap();
        let requests = vec![
            request("same", Some("grep"), json!({})),
            request("same", None, json!({})),
        ];

        let results = LocalObservationRunner::default()
            .run_observations(&requests, dir.path())
            .await;
        assert_eq!(results["same"], json!({"error": "No tool specified"}));
    }

    #[tokio::test]
    async fn test_slow_requests_share_one_timeout() {
        if which::which("python3").is_err() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("slow.py"),
            "import time\ntime.sleep(5)\n\nclass SlowError(Exception):\n    pass\n",
        )
        .unwrap();

        let requests: Vec<ObservationRequest> = ["a", "b", "c"]
            .iter()
            .map(|name| {
                request(
                    name,
                    Some("exception_hierarchy"),
                    json!({"class_name": "slow.SlowError"}),
                )
            })
            .collect();

        let timeout = Duration::from_millis(600);
        let started = Instant::now();
        let results = LocalObservationRunner::new(timeout)
            .run_observations(&requests, dir.path())
            .await;
        let elapsed = started.elapsed();

        for name in ["a", "b", "c"] {
            assert!(results[name]["error"].as_str().unwrap().contains("timed out"));
        }
        // one after another would take at least three timeouts
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout * 2, "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_timeout_becomes_error_result() {
        let dir = tempfile::tempdir().unwrap();
        let runner = LocalObservationRunner::new(Duration::from_millis(10));
        let kind = ObservationKind::resolve(
            "coverage_map_files",
            &Map::from_iter([("test_pattern".to_string(), json!("test_"))]),
            dir.path(),
        )
        .unwrap();

        let value = runner.bounded(&kind, std::future::pending()).await;
        assert_eq!(value["pattern"], "test_");
        assert!(value["error"].as_str().unwrap().contains("timed out"));
    }
}
