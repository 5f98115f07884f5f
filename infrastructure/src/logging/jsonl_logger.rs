//! JSONL file writer for research events.
//!
//! Each [`ResearchEvent`] becomes one JSON line carrying `type` and
//! `timestamp` next to the payload fields. Runs append to the same file.

use deepdive_application::{ResearchEvent, ResearchEventLogger};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line
/// and on `Drop`.
pub struct JsonlEventLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventLogger {
    /// Open (or create) the log file, creating parent directories.
    ///
    /// Returns `None` if the file cannot be opened; callers fall back to
    /// [`NoEventLogger`](deepdive_application::NoEventLogger).
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create event log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open event log file {}: {}", path.display(), e);
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

fn to_record(event: ResearchEvent, timestamp: String) -> Value {
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

impl ResearchEventLogger for JsonlEventLogger {
    fn log(&self, event: ResearchEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let Ok(line) = serde_json::to_string(&to_record(event, timestamp)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlEventLogger {
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
        let path = dir.path().join("logs/research.jsonl");
        let logger = JsonlEventLogger::new(&path).unwrap();

        logger.log(ResearchEvent::new(
            ResearchEvent::PHASE_STARTED,
            json!({"phase": "searching", "total_tasks": 3}),
        ));
        logger.log(ResearchEvent::new(
            ResearchEvent::PARTIAL_FAILURE,
            json!({"phase": "extracting", "error": "HTTP 404"}),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "phase_started");
        assert_eq!(records[0]["phase"], "searching");
        assert_eq!(records[0]["total_tasks"], 3);
        assert_eq!(records[1]["type"], "partial_failure");
        assert!(records.iter().all(|r| r["timestamp"].is_string()));
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let logger = JsonlEventLogger::new(&path).unwrap();

        logger.log(ResearchEvent::new(ResearchEvent::RESEARCH_FAILED, json!("boom")));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["type"], "research_failed");
        assert_eq!(records[0]["data"], "boom");
    }

    #[test]
    fn test_appends_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        for _ in 0..2 {
            let logger = JsonlEventLogger::new(&path).unwrap();
            logger.log(ResearchEvent::new(ResearchEvent::RESEARCH_COMPLETED, json!({})));
        }

        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_path_is_a_directory_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonlEventLogger::new(dir.path()).is_none());
    }
}
