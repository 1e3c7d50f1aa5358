//! Coverage tools: test_coverage, coverage_map_tests, coverage_map_files
//!
//! `coverage-map.json` at the repository root holds two indexes produced by
//! a per-test coverage run:
//!
//! ```json
//! {
//!   "file_to_tests": {"src/app.py": ["tests/test_app.py::test_run"]},
//!   "test_to_files": {"tests/test_app.py::test_run": ["src/app.py"]}
//! }
//! ```

use super::search::tests_by_naming_convention;
use codequorum_domain::ObservationError;
use codequorum_domain::observation::kind::{CoverageMapFilesParams, FileTarget};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub const COVERAGE_MAP_FILE: &str = "coverage-map.json";

#[derive(Debug, Default, Deserialize)]
struct CoverageMap {
    #[serde(default)]
    file_to_tests: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    test_to_files: BTreeMap<String, Vec<String>>,
}

async fn load_map(repo_path: &str) -> Result<CoverageMap, ObservationError> {
    let path = Path::new(repo_path).join(COVERAGE_MAP_FILE);
    if !path.exists() {
        return Err(ObservationError::Failed(format!(
            "{} not found",
            COVERAGE_MAP_FILE
        )));
    }
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ObservationError::io(COVERAGE_MAP_FILE, e))?;
    serde_json::from_str(&content).map_err(|e| ObservationError::parse(COVERAGE_MAP_FILE, e))
}

/// Tests covering `file_path`: exact path first, else the first mapped file
/// containing it or ending with it.
fn lookup<'m>(map: &'m CoverageMap, file_path: &str, repo_path: &str) -> (String, &'m [String]) {
    let normalized = match file_path.strip_prefix(repo_path) {
        Some(rest) if !repo_path.is_empty() => rest.trim_start_matches('/'),
        _ => file_path,
    };

    if let Some(tests) = map.file_to_tests.get(normalized)
        && !tests.is_empty()
    {
        return (normalized.to_string(), tests);
    }

    map.file_to_tests
        .iter()
        .find(|(mapped, _)| mapped.contains(normalized) || mapped.ends_with(normalized))
        .map(|(mapped, tests)| (mapped.clone(), tests.as_slice()))
        .unwrap_or_else(|| (normalized.to_string(), Default::default()))
}

pub async fn coverage_map_tests(target: &FileTarget) -> Result<Value, ObservationError> {
    let map = load_map(&target.repo_path).await?;
    let (source_file, tests) = lookup(&map, &target.file_path, &target.repo_path);

    Ok(json!({
        "source_file": source_file,
        "tests": tests,
        "test_count": tests.len(),
        "method": "coverage_map",
    }))
}

pub async fn coverage_map_files(params: &CoverageMapFilesParams) -> Result<Value, ObservationError> {
    let map = load_map(&params.repo_path).await?;

    let mut matched_tests = 0;
    let mut files = BTreeSet::new();
    for (test, covered) in &map.test_to_files {
        if test.contains(&params.test_pattern) {
            matched_tests += 1;
            files.extend(covered.iter().cloned());
        }
    }

    Ok(json!({
        "pattern": params.test_pattern,
        "matched_tests": matched_tests,
        "file_count": files.len(),
        "files": files,
        "method": "coverage_map",
    }))
}

/// Tests for a file: the coverage map when it knows the file, otherwise
/// test files named after the module.
pub async fn test_coverage(target: &FileTarget) -> Result<Value, ObservationError> {
    if let Ok(result) = coverage_map_tests(target).await
        && result["test_count"].as_u64().is_some_and(|n| n > 0)
    {
        return Ok(result);
    }

    let file_path = target.file_path.clone();
    let repo_path = target.repo_path.clone();
    let test_files = tokio::task::spawn_blocking(move || {
        tests_by_naming_convention(&file_path, Path::new(&repo_path))
    })
    .await
    .map_err(|e| ObservationError::Failed(format!("Search task failed: {}", e)))??;

    Ok(json!({
        "source_file": target.file_path,
        "test_files": test_files,
        "method": "naming_convention",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn repo_with_map() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(COVERAGE_MAP_FILE),
            json!({
                "file_to_tests": {
                    "src/pkg/client.py": ["tests/test_client.py::test_get", "tests/test_client.py::test_retry"],
                    "src/pkg/server.py": []
                },
                "test_to_files": {
                    "tests/test_client.py::test_get": ["src/pkg/client.py", "src/pkg/util.py"],
                    "tests/test_client.py::test_retry": ["src/pkg/client.py"],
                    "tests/test_server.py::test_boot": ["src/pkg/server.py"]
                }
            })
            .to_string(),
        )
        .unwrap();
        dir
    }

    fn target(dir: &Path, file_path: &str) -> FileTarget {
        FileTarget {
            file_path: file_path.into(),
            repo_path: dir.to_string_lossy().into_owned(),
        }
    }

    #[tokio::test]
    async fn test_exact_and_partial_lookup() {
        let dir = repo_with_map();

        let exact = coverage_map_tests(&target(dir.path(), "src/pkg/client.py"))
            .await
            .unwrap();
        assert_eq!(exact["source_file"], "src/pkg/client.py");
        assert_eq!(exact["test_count"], 2);
        assert_eq!(exact["method"], "coverage_map");

        let partial = coverage_map_tests(&target(dir.path(), "pkg/client.py"))
            .await
            .unwrap();
        assert_eq!(partial["source_file"], "src/pkg/client.py");
        assert_eq!(partial["test_count"], 2);
    }

    #[tokio::test]
    async fn test_repo_prefix_is_stripped() {
        let dir = repo_with_map();
        let absolute = format!("{}/src/pkg/client.py", dir.path().display());

        let result = coverage_map_tests(&target(dir.path(), &absolute))
            .await
            .unwrap();
        assert_eq!(result["source_file"], "src/pkg/client.py");
    }

    #[tokio::test]
    async fn test_missing_map() {
        let dir = tempfile::tempdir().unwrap();
        let err = coverage_map_tests(&target(dir.path(), "a.py"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "coverage-map.json not found");
    }

    #[tokio::test]
    async fn test_files_for_pattern() {
        let dir = repo_with_map();
        let params = CoverageMapFilesParams {
            test_pattern: "test_client".into(),
            repo_path: dir.path().to_string_lossy().into_owned(),
        };
        let result = coverage_map_files(&params).await.unwrap();

        assert_eq!(result["matched_tests"], 2);
        assert_eq!(result["files"], json!(["src/pkg/client.py", "src/pkg/util.py"]));
        assert_eq!(result["file_count"], 2);
    }

    #[tokio::test]
    async fn test_coverage_prefers_map() {
        let dir = repo_with_map();
        let result = test_coverage(&target(dir.path(), "src/pkg/client.py"))
            .await
            .unwrap();
        assert_eq!(result["method"], "coverage_map");
    }

    #[tokio::test]
    async fn test_coverage_falls_back_to_naming() {
        let dir = repo_with_map();
        fs::create_dir_all(dir.path().join("tests")).unwrap();
        fs::write(dir.path().join("tests/test_server.py"), "").unwrap();

        let result = test_coverage(&target(dir.path(), "src/pkg/server.py"))
            .await
            .unwrap();
        assert_eq!(result["method"], "naming_convention");
        assert_eq!(result["source_file"], "src/pkg/server.py");
        assert_eq!(result["test_files"], json!(["tests/test_server.py"]));
    }
}
