//! CLI model runner
//!
//! Each model is an external command that reads the prompt on stdin and
//! writes its review to stdout. The registry maps a model name to the argv
//! used to start it:
//!
//! | Model | Command |
//! |-------|---------|
//! | `claude` | `claude -p` |
//! | `gemini` | `gemini -p ""` |

use async_trait::async_trait;
use codequorum_application::ports::model_runner::{ModelError, ModelRunner};
use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Set inside an interactive `claude` session; a nested `claude` refuses
/// to start while it is present.
const NESTED_SESSION_ENV: &str = "CLAUDECODE";

/// Built-in model registry
pub fn default_commands() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        (
            "claude".to_string(),
            vec!["claude".to_string(), "-p".to_string()],
        ),
        (
            "gemini".to_string(),
            vec!["gemini".to_string(), "-p".to_string(), String::new()],
        ),
    ])
}

/// Runs models as child processes
#[derive(Debug, Clone)]
pub struct CliModelRunner {
    commands: BTreeMap<String, Vec<String>>,
}

impl Default for CliModelRunner {
    fn default() -> Self {
        Self::new(default_commands())
    }
}

impl CliModelRunner {
    pub fn new(commands: BTreeMap<String, Vec<String>>) -> Self {
        Self { commands }
    }

    /// The argv registered for `model`
    pub fn command(&self, model: &str) -> Option<&[String]> {
        self.commands.get(model).map(Vec::as_slice)
    }

    /// Whether `model` is registered and its executable is on `PATH`
    pub fn is_available(&self, model: &str) -> bool {
        self.command(model)
            .and_then(|argv| argv.first())
            .is_some_and(|program| which::which(program).is_ok())
    }

    /// Models from `models` that cannot be run
    pub fn preflight(&self, models: &[String]) -> Vec<String> {
        models
            .iter()
            .filter(|model| !self.is_available(model))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ModelRunner for CliModelRunner {
    async fn run(
        &self,
        model: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, ModelError> {
        let Some((program, args)) = self.command(model).and_then(|argv| argv.split_first()) else {
            return Err(ModelError::UnknownModel {
                model: model.to_string(),
                available: self.available_models(),
            });
        };

        debug!("Starting {}: {} {:?}", model, program, args);

        let mut child = Command::new(program)
            .args(args)
            .env_remove(NESTED_SESSION_ENV)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ModelError::Spawn {
                model: model.to_string(),
                message: e.to_string(),
            })?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin
                && let Err(e) = stdin.write_all(prompt.as_bytes()).await
            {
                // The model may exit without reading everything
                debug!("Could not write full prompt to {}: {}", model, e);
            }
        };

        let (_, output) = tokio::time::timeout(timeout, async {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .map_err(|_| ModelError::Timeout {
            model: model.to_string(),
            secs: timeout.as_secs(),
        })?;

        let output = output.map_err(|e| ModelError::Spawn {
            model: model.to_string(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                format!("exit status {}", output.status)
            } else {
                stderr
            };
            return Err(ModelError::Failed {
                model: model.to_string(),
                stderr,
            });
        }

        info!("Model {} responded ({} bytes)", model, output.stdout.len());
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn available_models(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }
}
