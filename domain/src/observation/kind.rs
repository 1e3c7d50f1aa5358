//! Typed observation tools.
//!
//! Every tool has a fixed parameter record. [`ObservationKind::resolve`]
//! turns the loosely-typed `{tool, params}` pair a model asked for into one
//! of these records, rejecting unknown tools, missing or wrongly-typed
//! parameters and parameters the tool does not take.

use super::error::ObservationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Parameter name under which the repository root is injected.
pub const REPO_PATH_PARAM: &str = "repo_path";

/// Catalogue entry describing one observation tool for prompts and help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: &'static str,
    /// Parameters the model is expected to supply
    pub params: &'static str,
    pub purpose: &'static str,
    pub when_to_use: &'static str,
    accepts_repo_path: bool,
}

impl ToolInfo {
    const fn new(
        name: &'static str,
        params: &'static str,
        purpose: &'static str,
        when_to_use: &'static str,
        accepts_repo_path: bool,
    ) -> Self {
        Self {
            name,
            params,
            purpose,
            when_to_use,
            accepts_repo_path,
        }
    }

    pub fn find(name: &str) -> Option<&'static ToolInfo> {
        TOOLS.iter().find(|t| t.name == name)
    }
}

/// Every registered observation tool.
pub static TOOLS: [ToolInfo; 10] = [
    ToolInfo::new(
        "exception_hierarchy",
        "class_name",
        "Show exception MRO and subclasses",
        "Retry logic, exception handling",
        false,
    ),
    ToolInfo::new(
        "raises_analysis",
        "file_path, function_name",
        "What exceptions a function raises",
        "New function calls, error paths",
        true,
    ),
    ToolInfo::new(
        "call_graph",
        "file_path, function_name",
        "What a function calls",
        "Impact analysis",
        true,
    ),
    ToolInfo::new(
        "find_usages",
        "symbol",
        "Where a symbol is used",
        "Integration verification",
        true,
    ),
    ToolInfo::new(
        "git_blame",
        "file_path, start_line, end_line",
        "Who last changed a line range",
        "Understanding why code looks the way it does",
        true,
    ),
    ToolInfo::new(
        "test_coverage",
        "file_path",
        "Find tests for a file (uses coverage-map if available)",
        "Test coverage claims",
        true,
    ),
    ToolInfo::new(
        "coverage_map_tests",
        "file_path",
        "Find tests covering a file (from coverage-map.json)",
        "Precise test coverage from actual execution",
        true,
    ),
    ToolInfo::new(
        "coverage_map_files",
        "test_pattern",
        "Find files covered by tests matching a pattern",
        "Impact analysis for test changes",
        true,
    ),
    ToolInfo::new(
        "file_imports",
        "file_path",
        "Extract imports from a file",
        "Verify import changes, check dependencies",
        true,
    ),
    ToolInfo::new(
        "project_dependencies",
        "(none)",
        "Get pyproject.toml/requirements.txt",
        "Verify new imports have dependencies",
        true,
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExceptionHierarchyParams {
    /// Dotted name (`httpx.TransportError`) or a builtin (`ValueError`)
    pub class_name: String,
}

/// A function inside a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionTarget {
    pub file_path: String,
    pub function_name: String,
    pub repo_path: String,
}

/// A single source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileTarget {
    pub file_path: String,
    pub repo_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindUsagesParams {
    pub symbol: String,
    pub repo_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitBlameParams {
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub repo_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoverageMapFilesParams {
    pub test_pattern: String,
    pub repo_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDependenciesParams {
    pub repo_path: String,
}

/// A fully resolved observation, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationKind {
    ExceptionHierarchy(ExceptionHierarchyParams),
    RaisesAnalysis(FunctionTarget),
    CallGraph(FunctionTarget),
    FindUsages(FindUsagesParams),
    GitBlame(GitBlameParams),
    TestCoverage(FileTarget),
    CoverageMapTests(FileTarget),
    CoverageMapFiles(CoverageMapFilesParams),
    FileImports(FileTarget),
    ProjectDependencies(ProjectDependenciesParams),
}

fn decode<T: DeserializeOwned>(
    tool: &str,
    params: Map<String, Value>,
    received: &[String],
) -> Result<T, ObservationError> {
    serde_json::from_value(Value::Object(params)).map_err(|e| ObservationError::InvalidParams {
        tool: tool.to_string(),
        message: e.to_string(),
        received: received.to_vec(),
    })
}

impl ObservationKind {
    /// Resolve a tool name and raw parameters into a typed observation.
    ///
    /// `repo_path` is added under [`REPO_PATH_PARAM`] when the tool takes it
    /// and the caller did not pass one.
    pub fn resolve(
        tool: &str,
        params: &Map<String, Value>,
        repo_path: &Path,
    ) -> Result<Self, ObservationError> {
        let info =
            ToolInfo::find(tool).ok_or_else(|| ObservationError::UnknownTool(tool.to_string()))?;

        let received: Vec<String> = params.keys().cloned().collect();
        let mut params = params.clone();
        if info.accepts_repo_path && !params.contains_key(REPO_PATH_PARAM) {
            params.insert(
                REPO_PATH_PARAM.to_string(),
                Value::String(repo_path.to_string_lossy().into_owned()),
            );
        }

        let kind = match info.name {
            "exception_hierarchy" => Self::ExceptionHierarchy(decode(tool, params, &received)?),
            "raises_analysis" => Self::RaisesAnalysis(decode(tool, params, &received)?),
            "call_graph" => Self::CallGraph(decode(tool, params, &received)?),
            "find_usages" => Self::FindUsages(decode(tool, params, &received)?),
            "git_blame" => Self::GitBlame(decode(tool, params, &received)?),
            "test_coverage" => Self::TestCoverage(decode(tool, params, &received)?),
            "coverage_map_tests" => Self::CoverageMapTests(decode(tool, params, &received)?),
            "coverage_map_files" => Self::CoverageMapFiles(decode(tool, params, &received)?),
            "file_imports" => Self::FileImports(decode(tool, params, &received)?),
            "project_dependencies" => Self::ProjectDependencies(decode(tool, params, &received)?),
            other => return Err(ObservationError::UnknownTool(other.to_string())),
        };
        Ok(kind)
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::ExceptionHierarchy(_) => "exception_hierarchy",
            Self::RaisesAnalysis(_) => "raises_analysis",
            Self::CallGraph(_) => "call_graph",
            Self::FindUsages(_) => "find_usages",
            Self::GitBlame(_) => "git_blame",
            Self::TestCoverage(_) => "test_coverage",
            Self::CoverageMapTests(_) => "coverage_map_tests",
            Self::CoverageMapFiles(_) => "coverage_map_files",
            Self::FileImports(_) => "file_imports",
            Self::ProjectDependencies(_) => "project_dependencies",
        }
    }

    /// The `(key, value)` that identifies the subject in an error result.
    pub fn error_context(&self) -> (&'static str, &str) {
        match self {
            Self::ExceptionHierarchy(p) => ("class", p.class_name.as_str()),
            Self::RaisesAnalysis(p) | Self::CallGraph(p) => ("function", p.function_name.as_str()),
            Self::FindUsages(p) => ("symbol", p.symbol.as_str()),
            Self::GitBlame(p) => ("file", p.file_path.as_str()),
            Self::TestCoverage(p) | Self::CoverageMapTests(p) | Self::FileImports(p) => {
                ("file", p.file_path.as_str())
            }
            Self::CoverageMapFiles(p) => ("pattern", p.test_pattern.as_str()),
            Self::ProjectDependencies(p) => ("repo", p.repo_path.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_resolve_injects_repo_path() {
        let kind = ObservationKind::resolve(
            "call_graph",
            &params(json!({"file_path": "app.py", "function_name": "main"})),
            Path::new("/repo"),
        )
        .unwrap();

        assert_eq!(
            kind,
            ObservationKind::CallGraph(FunctionTarget {
                file_path: "app.py".to_string(),
                function_name: "main".to_string(),
                repo_path: "/repo".to_string(),
            })
        );
        assert_eq!(kind.tool_name(), "call_graph");
        assert_eq!(kind.error_context(), ("function", "main"));
    }

    #[test]
    fn test_resolve_keeps_caller_repo_path() {
        let kind = ObservationKind::resolve(
            "project_dependencies",
            &params(json!({"repo_path": "/elsewhere"})),
            Path::new("/repo"),
        )
        .unwrap();

        match kind {
            ObservationKind::ProjectDependencies(p) => assert_eq!(p.repo_path, "/elsewhere"),
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_unknown_tool() {
        let err = ObservationKind::resolve("rm_rf", &Map::new(), Path::new("/repo")).unwrap_err();
        assert_eq!(err, ObservationError::UnknownTool("rm_rf".to_string()));
        assert_eq!(err.to_string(), "Unknown tool: rm_rf");
    }

    #[test]
    fn test_resolve_missing_param() {
        let err = ObservationKind::resolve(
            "raises_analysis",
            &params(json!({"file_path": "app.py"})),
            Path::new("/repo"),
        )
        .unwrap_err();

        match err {
            ObservationError::InvalidParams {
                tool,
                message,
                received,
            } => {
                assert_eq!(tool, "raises_analysis");
                assert!(message.contains("function_name"));
                assert_eq!(received, vec!["file_path".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_wrong_type() {
        let err = ObservationKind::resolve(
            "git_blame",
            &params(json!({"file_path": "a.py", "start_line": "ten", "end_line": 20})),
            Path::new("/repo"),
        )
        .unwrap_err();
        assert!(matches!(err, ObservationError::InvalidParams { .. }));
    }

    #[test]
    fn test_resolve_rejects_extra_params() {
        let err = ObservationKind::resolve(
            "exception_hierarchy",
            &params(json!({"class_name": "ValueError", "depth": 3})),
            Path::new("/repo"),
        )
        .unwrap_err();

        match err {
            ObservationError::InvalidParams { message, .. } => assert!(message.contains("depth")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_exception_hierarchy_takes_no_repo_path() {
        let kind = ObservationKind::resolve(
            "exception_hierarchy",
            &params(json!({"class_name": "builtins.OSError"})),
            Path::new("/repo"),
        )
        .unwrap();
        assert_eq!(kind.error_context(), ("class", "builtins.OSError"));
    }

    #[test]
    fn test_catalogue_is_complete() {
        for info in TOOLS.iter() {
            assert_eq!(ToolInfo::find(info.name), Some(info));
        }
        assert!(ToolInfo::find("grep").is_none());
    }
}
