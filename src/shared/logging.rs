use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only JSON-line log. Write failures never reach the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientLog {
    path: Option<PathBuf>,
}

impl ClientLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, event: &str, message: &str) {
        self.write("info", event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.write("warn", event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.write("error", event, message);
    }

    fn write(&self, level: &str, event: &str, message: &str) {
        if let Some(path) = &self.path {
            append_client_log(path, level, event, message);
        }
    }
}

pub fn append_client_log(path: &Path, level: &str, event: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": chrono::Utc::now().timestamp(),
        "level": level,
        "event": event,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}
