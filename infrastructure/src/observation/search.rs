//! Repository search tools: find_usages and test-file discovery

use codequorum_domain::observation::kind::FindUsagesParams;
use codequorum_domain::{ObservationError, clip};
use glob::Pattern;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

/// Usages listed in a find_usages result (total_count still counts all)
const MAX_USAGES: usize = 30;

/// Characters of the matching line kept per usage
const MAX_USAGE_TEXT: usize = 100;

/// Maximum file size searched (5 MB)
const MAX_SEARCH_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Every `.py` file under `repo_path`, in path order
pub(crate) fn python_files(repo_path: &Path) -> Result<Vec<PathBuf>, ObservationError> {
    let pattern = format!("{}/**/*.py", Pattern::escape(&repo_path.to_string_lossy()));
    let entries = glob::glob(&pattern)
        .map_err(|e| ObservationError::Failed(format!("Invalid search path: {}", e)))?;

    Ok(entries.filter_map(Result::ok).filter(|p| p.is_file()).collect())
}

/// Path relative to the repository, as shown to the model
pub(crate) fn relative(path: &Path, repo_path: &Path) -> String {
    path.strip_prefix(repo_path)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn search_usages(symbol: &str, repo_path: &Path) -> Result<Value, ObservationError> {
    let mut usages = Vec::new();

    for file in python_files(repo_path)? {
        if fs::metadata(&file).is_ok_and(|m| m.len() > MAX_SEARCH_FILE_SIZE) {
            continue;
        }
        let Ok(content) = fs::read_to_string(&file) else {
            continue;
        };
        let display = relative(&file, repo_path);

        for (index, line) in content.lines().enumerate() {
            if line.contains(symbol) {
                usages.push(json!({
                    "file": display,
                    "line": index + 1,
                    "text": clip(line.trim(), MAX_USAGE_TEXT),
                }));
            }
        }
    }

    let total_count = usages.len();
    usages.truncate(MAX_USAGES);

    Ok(json!({
        "symbol": symbol,
        "usages": usages,
        "total_count": total_count,
    }))
}

/// Literal (non-regex) search for a symbol across the repository's Python files
pub async fn find_usages(params: &FindUsagesParams) -> Result<Value, ObservationError> {
    let symbol = params.symbol.clone();
    let repo_path = PathBuf::from(&params.repo_path);

    tokio::task::spawn_blocking(move || search_usages(&symbol, &repo_path))
        .await
        .map_err(|e| ObservationError::Failed(format!("Search task failed: {}", e)))?
}

/// Test files under a `tests` directory named after the module:
/// `test_<stem>.py`, `<stem>_test.py` or `test_<stem>*.py`.
pub(crate) fn tests_by_naming_convention(
    file_path: &str,
    repo_path: &Path,
) -> Result<Vec<String>, ObservationError> {
    let stem = Path::new(file_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let escaped = Pattern::escape(&stem);

    let patterns = [
        format!("test_{}.py", escaped),
        format!("{}_test.py", escaped),
        format!("test_{}*.py", escaped),
    ]
    .iter()
    .map(|p| Pattern::new(p))
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| ObservationError::Failed(format!("Invalid module name: {}", e)))?;

    let mut found: Vec<String> = python_files(repo_path)?
        .into_iter()
        .filter(|path| path.to_string_lossy().contains("/tests/"))
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy())
                .is_some_and(|name| patterns.iter().any(|p| p.matches(&name)))
        })
        .map(|path| relative(&path, repo_path))
        .collect();

    found.sort();
    found.dedup();
    Ok(found)
}
