//! JSONL file writer for review events.
//!
//! Each [`ReviewEvent`] is serialized as a single JSON line with a
//! `type` field and `timestamp`, appended to the file via a buffered writer.

use codequorum_application::ports::review_logger::{ReviewEvent, ReviewLogger};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL review logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`, so concurrent model loops can
/// share one transcript. Flushes on `Drop`.
pub struct JsonlReviewLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlReviewLogger {
    /// Open a transcript at the given path, appending to an existing file.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create transcript directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open transcript file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn to_record(event: ReviewEvent, timestamp: String) -> Value {
    match event.payload {
        Value::Object(mut map) => {
            map.insert("type".to_string(), Value::String(event.event_type.to_string()));
            map.insert("timestamp".to_string(), Value::String(timestamp));
            Value::Object(map)
        }
        other => serde_json::json!({
            "type": event.event_type,
            "timestamp": timestamp,
            "data": other,
        }),
    }
}

impl ReviewLogger for JsonlReviewLogger {
    fn log(&self, event: ReviewEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let record = to_record(event, timestamp);

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlReviewLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/review.jsonl");
        let logger = JsonlReviewLogger::new(&path).unwrap();

        logger.log(ReviewEvent::model_prompt("claude", 0, "review this"));
        logger.log(ReviewEvent::observations(
            "claude",
            0,
            &json!({"deps": {"repo": "/tmp/x"}}),
        ));
        logger.log(ReviewEvent::model_failed("gemini", "Model gemini timed out after 5s"));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 3);
        for record in &records {
            assert!(record["timestamp"].is_string());
        }
        assert_eq!(records[0]["type"], "model_prompt");
        assert_eq!(records[0]["iteration"], 0);
        assert_eq!(records[0]["prompt"], "review this");
        assert_eq!(records[1]["results"]["deps"]["repo"], "/tmp/x");
        assert_eq!(records[2]["type"], "model_failed");
        assert_eq!(records[2]["model"], "gemini");
    }

    #[test]
    fn test_appends_to_existing_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.jsonl");

        let first = JsonlReviewLogger::new(&path).unwrap();
        first.log(ReviewEvent::model_response("claude", 0, "one"));
        drop(first);

        let second = JsonlReviewLogger::new(&path).unwrap();
        second.log(ReviewEvent::model_response("claude", 1, "two"));
        drop(second);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["response"], "two");
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.jsonl");
        let logger = JsonlReviewLogger::new(&path).unwrap();

        logger.log(ReviewEvent::new("note", json!("just a string")));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["type"], "note");
        assert_eq!(records[0]["data"], "just a string");
    }

    #[test]
    fn test_unopenable_path_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        assert!(JsonlReviewLogger::new(blocker.join("review.jsonl")).is_none());
    }
}
