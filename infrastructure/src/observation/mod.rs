//! Observation tools executed on the local machine
//!
//! [`LocalObservationRunner`] implements the application layer's
//! [`ObservationPort`](codequorum_application::ObservationPort).
//!
//! | Tool | Implementation |
//! |------|----------------|
//! | `exception_hierarchy` | `python3` child process |
//! | `raises_analysis`, `call_graph`, `file_imports` | tree-sitter syntax tree |
//! | `find_usages` | literal search over `**/*.py` |
//! | `git_blame` | `git blame --porcelain` |
//! | `test_coverage`, `coverage_map_tests`, `coverage_map_files` | `coverage-map.json`, test naming conventions |
//! | `project_dependencies` | `pyproject.toml`, `requirements*.txt` |

mod coverage;
mod dependencies;
mod exception_hierarchy;
mod git_blame;
mod python_ast;
mod runner;
mod search;

pub use runner::LocalObservationRunner;

use std::path::{Path, PathBuf};

/// Relative paths resolve against the repository
pub(crate) fn resolve_path(repo_path: &str, file_path: &str) -> PathBuf {
    let path = Path::new(file_path);
    if path.is_absolute() || repo_path.is_empty() {
        path.to_path_buf()
    } else {
        Path::new(repo_path).join(path)
    }
}
