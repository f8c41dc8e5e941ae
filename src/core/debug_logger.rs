use std::collections::HashMap;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Local;
use flate2::{write::GzEncoder, Compression};
use fs2::FileExt;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const DEBUG_ENV: &str = "MCPBRIDGE_DEBUG";
pub const DEBUG_LOG_PATH_ENV: &str = "MCPBRIDGE_DEBUG_LOG";

const ROTATE_AT_BYTES: u64 = 8 * 1024 * 1024;
const KEEP_ARCHIVES: usize = 5;
const SIZE_CHECK_EVERY: u32 = 200;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String, // RFC 3339, local offset
    pub level: String,     // DEBUG, ERROR, PERF, BRIDGE, AGENT
    pub component: String,
    pub event: String,
    pub message: String, // redacted
    pub correlation_id: Option<String>,
    pub fields: HashMap<String, Value>,
}

/// Append-only JSONL file that rolls into gzip archives once it grows large
struct RotatingFile {
    path: PathBuf,
    writes: AtomicU32,
}

impl RotatingFile {
    fn new(path: PathBuf) -> Self {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        Self {
            path,
            writes: AtomicU32::new(0),
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if self.writes.fetch_add(1, Ordering::Relaxed) % SIZE_CHECK_EVERY == 0 {
            let _ = self.roll_if_oversized();
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }

    fn oversized(&self) -> std::io::Result<bool> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() >= ROTATE_AT_BYTES),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn roll_if_oversized(&self) -> std::io::Result<()> {
        if !self.oversized()? {
            return Ok(());
        }

        // Another process holding the lock is already rolling; skip
        let lock_path = self.path.with_extension("lock");
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)?;
        if lock.try_lock_exclusive().is_err() {
            return Ok(());
        }

        let result = if self.oversized()? {
            self.roll()
        } else {
            Ok(())
        };
        let _ = std::fs::remove_file(&lock_path);
        result
    }

    fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mcpbridge-debug".to_string())
    }

    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    fn roll(&self) -> std::io::Result<()> {
        let archive = self.dir().join(format!(
            "{}.{}.gz",
            self.stem(),
            Local::now().format("%Y%m%d_%H%M%S")
        ));

        let staging = self.path.with_extension("rotating");
        std::fs::rename(&self.path, &staging)?;

        let mut encoder = GzEncoder::new(File::create(&archive)?, Compression::default());
        std::io::copy(&mut BufReader::new(File::open(&staging)?), &mut encoder)?;
        encoder.finish()?;
        std::fs::remove_file(&staging)?;

        let _ = self.prune_archives();
        Ok(())
    }

    fn prune_archives(&self) -> std::io::Result<()> {
        let prefix = format!("{}.", self.stem());
        let mut archives = Vec::new();
        for entry in std::fs::read_dir(self.dir())? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) && name.ends_with(".gz") {
                archives.push((entry.path(), entry.metadata()?.modified()?));
            }
        }

        archives.sort_by_key(|(_, modified)| *modified);
        let excess = archives.len().saturating_sub(KEEP_ARCHIVES);
        for (path, _) in archives.into_iter().take(excess) {
            let _ = std::fs::remove_file(path);
        }
        Ok(())
    }
}

/// Structured JSONL debug logger
///
/// Disabled unless `MCPBRIDGE_DEBUG` is set to a truthy value. Writes go to
/// `~/.mcp-bridge/mcpbridge-debug.log` (or `MCPBRIDGE_DEBUG_LOG`). Logging
/// failures never propagate to callers.
pub struct EnhancedDebugLogger {
    enabled: bool,
    sink: Option<Arc<Mutex<RotatingFile>>>,
    session_id: String,
    redactions: Vec<Regex>,
}

impl EnhancedDebugLogger {
    pub fn new() -> Self {
        let enabled = Self::parse_debug_enabled();
        let sink = enabled.then(|| Arc::new(Mutex::new(RotatingFile::new(Self::log_path()))));
        Self {
            enabled,
            sink,
            session_id: Uuid::new_v4().to_string()[..8].to_string(),
            redactions: Self::compile_redactions(),
        }
    }

    /// Logger writing to an explicit file regardless of environment
    pub fn to_file(path: PathBuf) -> Self {
        Self {
            enabled: true,
            sink: Some(Arc::new(Mutex::new(RotatingFile::new(path)))),
            session_id: Uuid::new_v4().to_string()[..8].to_string(),
            redactions: Self::compile_redactions(),
        }
    }

    /// Logger that drops everything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            sink: None,
            session_id: String::new(),
            redactions: Vec::new(),
        }
    }

    /// Accepts true/false, 1/0, yes/no, on/off (case insensitive)
    fn parse_debug_enabled() -> bool {
        env::var(DEBUG_ENV)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
            .unwrap_or(false)
    }

    pub fn log_path() -> PathBuf {
        if let Ok(path) = env::var(DEBUG_LOG_PATH_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        crate::config::Config::base_dir().join("mcpbridge-debug.log")
    }

    fn compile_redactions() -> Vec<Regex> {
        [
            r"(?i)authorization[:\s]+[^\s\n]+",
            r"(?i)bearer[:\s]+[^\s\n]+",
            r"(?i)token[:\s]+[^\s\n]+",
            r"(?i)password[:\s]+[^\s\n]+",
            r"(?i)api[_-]?key[:\s]+[^\s\n]+",
            r"(?i)secret[:\s]+[^\s\n]+",
            r"(?i)([?&])key=[^&\s]+",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    }

    pub fn redact(&self, text: &str) -> String {
        let mut redacted = text.to_string();
        for regex in &self.redactions {
            redacted = regex.replace_all(&redacted, "[REDACTED]").into_owned();
        }

        // Long opaque strings are probably credentials
        let opaque = redacted.len() > 100
            && redacted
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if opaque {
            redacted = format!("[REDACTED_LONG_STRING_{}chars]", redacted.len());
        }
        redacted
    }

    fn log_sync(
        &self,
        level: &str,
        component: &str,
        event: &str,
        message: &str,
        correlation_id: Option<String>,
        fields: HashMap<String, Value>,
    ) {
        if !self.enabled {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            level: level.to_string(),
            component: component.to_string(),
            event: event.to_string(),
            message: self.redact(message),
            correlation_id: correlation_id.or_else(|| Some(self.session_id.clone())),
            fields,
        };

        if let Some(sink) = &self.sink {
            if let (Ok(file), Ok(line)) = (sink.lock(), serde_json::to_string(&entry)) {
                let _ = file.append(&line);
            }
        }
    }

    pub fn debug_sync(&self, component: &str, event: &str, message: &str) {
        self.log_sync("DEBUG", component, event, message, None, HashMap::new());
    }

    pub fn error_sync(&self, component: &str, event: &str, message: &str) {
        self.log_sync("ERROR", component, event, message, None, HashMap::new());
    }

    pub fn performance_sync(&self, component: &str, operation: &str, duration_ms: u64) {
        let mut fields = HashMap::new();
        fields.insert("duration_ms".to_string(), Value::from(duration_ms));
        self.log_sync("PERF", component, "operation_complete", operation, None, fields);
    }

    // Bridge request lifecycle

    pub fn bridge_request_start(&self, method: &str, url: &str, correlation_id: &str) {
        let mut fields = HashMap::new();
        fields.insert("method".to_string(), Value::from(method));
        fields.insert("url".to_string(), Value::from(self.redact(url)));
        if let Ok(host) = crate::core::bridge::url::extract_host(url) {
            fields.insert("host".to_string(), Value::from(host));
        }
        self.log_sync(
            "BRIDGE",
            "BridgeClient",
            "request_start",
            &format!("{} {}", method, url),
            Some(correlation_id.to_string()),
            fields,
        );
    }

    pub fn bridge_request_end(
        &self,
        outcome: &str,
        http_status: Option<u16>,
        duration_ms: u64,
        correlation_id: &str,
    ) {
        let mut fields = HashMap::new();
        fields.insert("outcome".to_string(), Value::from(outcome));
        fields.insert("duration_ms".to_string(), Value::from(duration_ms));
        if let Some(code) = http_status {
            fields.insert("http_status".to_string(), Value::from(code));
        }
        self.log_sync(
            "BRIDGE",
            "BridgeClient",
            "request_end",
            &format!("Request finished: {} ({}ms)", outcome, duration_ms),
            Some(correlation_id.to_string()),
            fields,
        );
    }

    // Agent loop

    pub fn agent_event(&self, event: &str, message: &str) {
        self.log_sync("AGENT", "AgentSession", event, message, None, HashMap::new());
    }

    pub fn tool_call(&self, server_id: &str, tool_name: &str, step: usize) {
        let mut fields = HashMap::new();
        fields.insert("server_id".to_string(), Value::from(server_id));
        fields.insert("tool_name".to_string(), Value::from(tool_name));
        fields.insert("step".to_string(), Value::from(step));
        self.log_sync(
            "AGENT",
            "AgentSession",
            "tool_call",
            &format!("Executing {}/{} (step {})", server_id, tool_name, step),
            None,
            fields,
        );
    }

    pub fn confirmation_decision(&self, confirmation_id: &str, approved: bool) {
        let mut fields = HashMap::new();
        fields.insert("confirmation_id".to_string(), Value::from(confirmation_id));
        fields.insert("approved".to_string(), Value::from(approved));
        self.log_sync(
            "AGENT",
            "Confirmation",
            "decision",
            &format!(
                "Confirmation {} {}",
                confirmation_id,
                if approved { "approved" } else { "rejected" }
            ),
            None,
            fields,
        );
    }

    pub fn collection_saved(&self, path: &Path, bytes: usize) {
        let mut fields = HashMap::new();
        fields.insert("path".to_string(), Value::from(path.display().to_string()));
        fields.insert("bytes".to_string(), Value::from(bytes));
        self.log_sync(
            "DEBUG",
            "Postman",
            "collection_saved",
            &format!("Collection written to {}", path.display()),
            None,
            fields,
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get_session_id(&self) -> &str {
        &self.session_id
    }
}

impl Default for EnhancedDebugLogger {
    fn default() -> Self {
        Self::new()
    }
}

pub fn get_debug_logger() -> EnhancedDebugLogger {
    EnhancedDebugLogger::new()
}
