//! git_blame: last commit and author per line of a range

use codequorum_domain::observation::kind::GitBlameParams;
use codequorum_domain::{ObservationError, clip};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;

const SHORT_COMMIT: usize = 8;
const MAX_CODE: usize = 60;

/// Parse `git blame --porcelain` output into `{commit, author, code}` entries.
///
/// Porcelain output repeats the author only the first time a commit appears,
/// so authors are remembered per commit.
fn parse_porcelain(output: &str) -> Vec<Value> {
    let mut authors: HashMap<&str, &str> = HashMap::new();
    let mut current_commit: Option<&str> = None;
    let mut blame = Vec::new();

    for line in output.lines() {
        if let Some(code) = line.strip_prefix('\t') {
            if let Some(commit) = current_commit
                && let Some(author) = authors.get(commit)
            {
                blame.push(json!({
                    "commit": clip(commit, SHORT_COMMIT),
                    "author": author,
                    "code": clip(code, MAX_CODE),
                }));
            }
        } else if let Some(author) = line.strip_prefix("author ") {
            if let Some(commit) = current_commit {
                authors.insert(commit, author);
            }
        } else if let Some(first) = line.split_whitespace().next()
            && first.len() == 40
            && line.contains(' ')
            && first.chars().all(|c| c.is_ascii_hexdigit())
        {
            current_commit = Some(first);
        }
    }

    blame
}

pub async fn git_blame(params: &GitBlameParams) -> Result<Value, ObservationError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(&params.repo_path)
        .arg("blame")
        .arg("-L")
        .arg(format!("{},{}", params.start_line, params.end_line))
        .arg("--porcelain")
        .arg(&params.file_path)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ObservationError::Command(format!("Failed to run git: {}", e)))?;

    if !output.status.success() {
        return Err(ObservationError::Command(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(json!({
        "file": params.file_path,
        "range": format!("{}-{}", params.start_line, params.end_line),
        "blame": parse_porcelain(&String::from_utf8_lossy(&output.stdout)),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORCELAIN: &str = "\
1f0c3b8a9d2e4f6a8b0c1d2e3f4a5b6c7d8e9f01 10 10 2
author Ada Lovelace
author-mail <ada@example.com>
summary Add retry loop
filename app.py
\tfor attempt in range(3):
2a1b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d 11 11 1
author Grace Hopper
filename app.py
\t    response = client.get(url, timeout=DEFAULT_TIMEOUT_SECONDS, headers=build_headers())
1f0c3b8a9d2e4f6a8b0c1d2e3f4a5b6c7d8e9f01 12 12
\t    break
";

    #[test]
    fn test_parse_porcelain() {
        let blame = parse_porcelain(PORCELAIN);
        assert_eq!(blame.len(), 3);
        assert_eq!(
            blame[0],
            json!({"commit": "1f0c3b8a", "author": "Ada Lovelace", "code": "for attempt in range(3):"})
        );
        assert_eq!(blame[1]["author"], "Grace Hopper");
        assert_eq!(blame[1]["code"].as_str().unwrap().chars().count(), MAX_CODE);
        // Repeated commit without its own author line
        assert_eq!(blame[2]["author"], "Ada Lovelace");
        assert_eq!(blame[2]["code"], "    break");
    }

    #[tokio::test]
    async fn test_blame_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let params = GitBlameParams {
            file_path: "missing.py".into(),
            start_line: 1,
            end_line: 2,
            repo_path: dir.path().to_string_lossy().into_owned(),
        };
        let err = git_blame(&params).await.unwrap_err();
        assert!(matches!(err, ObservationError::Command(_)));
    }
}
