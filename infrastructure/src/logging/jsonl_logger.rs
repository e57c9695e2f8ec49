//! JSONL file writer for call events.
//!
//! Each [`CallEvent`] becomes one JSON line: the payload fields plus `type`
//! and `timestamp`, appended through a buffered writer.

use navigator_application::{CallEvent, CallLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL call logger writing one JSON object per line.
///
/// Appends to an existing file so a retry extends the log of its run.
pub struct JsonlCallLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlCallLogger {
    /// Open (or create) the log file, creating parent directories.
    ///
    /// Returns `None` when the file cannot be opened; the run continues
    /// without a call log.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create call log directory {}: {}", parent.display(), e);
            return None;
        }

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(Self {
                writer: Mutex::new(BufWriter::new(file)),
                path: path.to_path_buf(),
            }),
            Err(e) => {
                warn!("Could not open call log {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: CallEvent) -> Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let mut map = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert("type".to_string(), Value::String(event.event_type.to_string()));
        map.insert("timestamp".to_string(), Value::String(timestamp));
        Value::Object(map)
    }
}

impl CallLogger for JsonlCallLogger {
    fn log(&self, event: CallEvent) {
        let Ok(line) = serde_json::to_string(&Self::record(event)) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlCallLogger {
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
    fn test_writes_one_record_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/calls.jsonl");
        let logger = JsonlCallLogger::open(&path).unwrap();

        logger.log(CallEvent::new(
            "chunk_call",
            json!({ "model": "gpt-5", "chunk": 2, "prompt_bytes": 18211, "status": "ok", "error": null }),
        ));
        logger.log(CallEvent::new(
            "final_call",
            json!({ "model": "gpt-5", "chunk": "final", "prompt_bytes": 950, "status": "error", "error": "Timeout after 30s" }),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "chunk_call");
        assert_eq!(lines[0]["chunk"], 2);
        assert!(lines[0]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(lines[1]["chunk"], "final");
        assert_eq!(lines[1]["error"], "Timeout after 30s");
    }

    #[test]
    fn test_appends_to_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.jsonl");
        for _ in 0..2 {
            let logger = JsonlCallLogger::open(&path).unwrap();
            logger.log(CallEvent::new("chunk_call", json!({ "model": "o3" })));
        }
        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.jsonl");
        let logger = JsonlCallLogger::open(&path).unwrap();
        logger.log(CallEvent::new("note", json!("free text")));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "note");
        assert_eq!(lines[0]["data"], "free text");
    }
}
