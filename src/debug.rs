use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Line-delimited JSON event sink for layout and encoding diagnostics.
#[derive(Clone)]
pub(crate) struct DebugLogger {
    inner: Arc<Mutex<DebugState>>,
}

struct DebugState {
    writer: BufWriter<File>,
    counters: BTreeMap<String, u64>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(DebugState {
                writer: BufWriter::new(file),
                counters: BTreeMap::new(),
            })),
        })
    }

    pub fn log_event(&self, event: &Value) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = writeln!(state.writer, "{event}");
        }
    }

    pub fn increment(&self, key: &str, amount: u64) {
        if let Ok(mut state) = self.inner.lock() {
            let entry = state.counters.entry(key.to_string()).or_insert(0);
            *entry = entry.saturating_add(amount);
        }
    }

    pub fn emit_summary(&self, context: &str) {
        if let Ok(mut state) = self.inner.lock() {
            let counters = std::mem::take(&mut state.counters);
            let event = json!({
                "type": "debug.summary",
                "context": context,
                "counts": counters,
            });
            let _ = writeln!(state.writer, "{event}");
        }
    }

    pub fn flush(&self) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = state.writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_and_summary_are_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.jsonl");
        let logger = DebugLogger::new(&path).unwrap();
        logger.log_event(&json!({"type": "layout.page_break", "reason": "break_after_page"}));
        logger.increment("layout.page_break", 1);
        logger.increment("layout.page_break", 2);
        logger.emit_summary("render");
        logger.flush();

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = raw
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["reason"], "break_after_page");
        assert_eq!(lines[1]["type"], "debug.summary");
        assert_eq!(lines[1]["counts"]["layout.page_break"], 3);
    }
}
