//! exception_hierarchy: MRO and subclasses of a Python exception class
//!
//! Needs a live interpreter, so the lookup runs in a `python3` child
//! process started in the repository so that project modules import.

use codequorum_domain::ObservationError;
use codequorum_domain::observation::kind::ExceptionHierarchyParams;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

const PYTHON: &str = "python3";

/// Prints the hierarchy of `sys.argv[1]` as JSON. Bare names are looked up
/// in builtins.
const SCRIPT: &str = r#"
import builtins, importlib, json, sys

name = sys.argv[1]
if "." in name:
    module_name, attr = name.rsplit(".", 1)
    cls = getattr(importlib.import_module(module_name), attr)
else:
    cls = getattr(builtins, name)

def subclasses(c):
    out = []
    for sub in c.__subclasses__():
        out.append(f"{sub.__module__}.{sub.__name__}")
        out.extend(subclasses(sub))
    return out

print(json.dumps({
    "class": name,
    "mro": [f"{c.__module__}.{c.__name__}" for c in cls.__mro__ if c is not object],
    "subclasses": subclasses(cls),
    "doc": cls.__doc__[:200] if cls.__doc__ else None,
}))
"#;

/// Message of the exception that ended the script, without its type
fn error_message(stderr: &str) -> String {
    let last = stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("python3 failed")
        .trim();

    match last.split_once(": ") {
        Some((kind, message))
            if !kind.is_empty() && kind.chars().all(|c| c.is_alphanumeric() || c == '.' || c == '_') =>
        {
            message.to_string()
        }
        _ => last.to_string(),
    }
}

pub async fn exception_hierarchy(
    params: &ExceptionHierarchyParams,
    repo_path: &Path,
) -> Result<Value, ObservationError> {
    let mut cmd = Command::new(PYTHON);
    cmd.arg("-c").arg(SCRIPT).arg(&params.class_name);
    if repo_path.is_dir() {
        cmd.current_dir(repo_path);
    }

    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ObservationError::Command(format!("Failed to run {}: {}", PYTHON, e)))?;

    if !output.status.success() {
        return Err(ObservationError::Failed(error_message(
            &String::from_utf8_lossy(&output.stderr),
        )));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|e| ObservationError::parse(format!("{} output", PYTHON), e))
}
