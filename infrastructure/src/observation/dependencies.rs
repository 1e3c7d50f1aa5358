//! project_dependencies: declared Python dependencies of the repository

use codequorum_domain::ObservationError;
use codequorum_domain::observation::kind::ProjectDependenciesParams;
use serde_json::{Map, Value, json};
use std::path::Path;
use tracing::debug;

async fn read_if_exists(path: &Path) -> Result<Option<String>, ObservationError> {
    if !path.exists() {
        return Ok(None);
    }
    tokio::fs::read_to_string(path)
        .await
        .map(Some)
        .map_err(|e| ObservationError::io(path.display().to_string(), e))
}

/// `[project]` dependencies and optional-dependencies, when the file parses
fn declared(pyproject: &str) -> Option<(Value, Value)> {
    let data: toml::Table = match toml::from_str(pyproject) {
        Ok(data) => data,
        Err(e) => {
            debug!("pyproject.toml does not parse: {}", e);
            return None;
        }
    };
    let project = data.get("project");
    let field = |key: &str, empty: Value| {
        project
            .and_then(|p| p.get(key))
            .and_then(|v| serde_json::to_value(v).ok())
            .unwrap_or(empty)
    };
    Some((
        field("dependencies", json!([])),
        field("optional-dependencies", json!({})),
    ))
}

/// Raw manifests (`pyproject.toml`, `requirements*.txt`) plus the parsed
/// `[project]` dependency lists.
pub async fn project_dependencies(
    params: &ProjectDependenciesParams,
) -> Result<Value, ObservationError> {
    let repo = Path::new(&params.repo_path);
    let mut result = Map::new();
    result.insert("repo".to_string(), json!(params.repo_path));

    let pyproject = read_if_exists(&repo.join("pyproject.toml")).await?;
    if let Some(content) = &pyproject {
        result.insert("pyproject_toml".to_string(), json!(content));
        if let Some((dependencies, optional)) = declared(content) {
            result.insert("dependencies".to_string(), dependencies);
            result.insert("optional_dependencies".to_string(), optional);
        }
    }

    let requirements = read_if_exists(&repo.join("requirements.txt")).await?;
    if let Some(content) = &requirements {
        result.insert("requirements_txt".to_string(), json!(content));
    }

    if let Some(content) = read_if_exists(&repo.join("requirements-dev.txt")).await? {
        result.insert("requirements_dev_txt".to_string(), json!(content));
    }

    if pyproject.is_none() && requirements.is_none() {
        result.insert(
            "error".to_string(),
            json!("No pyproject.toml or requirements.txt found"),
        );
    }

    Ok(Value::Object(result))
}
