use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
    /// In-world chat announcement.
    Say,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Say => "say",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() rather than write_str() so width flags apply; the server
        // renders the level in a fixed-width column.
        f.pad(self.as_str())
    }
}

/// Output channel the logger client routes events through.
///
/// Lives only in the client's process state; it is carried in [`Meta`] so
/// the server can show which channel produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Deliver over HTTP to the log server.
    External,
    /// Render to the local operator console.
    #[default]
    Console,
    /// Broadcast through the host's world messaging.
    Chat,
    /// Drop silently.
    None,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::External => "external",
            Mode::Console => "console",
            Mode::Chat => "chat",
            Mode::None => "none",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Event metadata appended by the client.
///
/// `from`, `version` and `mode` are fixed by the client and never
/// user-controlled. `ip` is absent on the wire; the server injects the
/// resolved client address before rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub from: String,
    pub version: String,
    pub mode: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl Meta {
    /// Creates client-side metadata for the given mode.
    pub fn new(version: impl Into<String>, mode: Mode) -> Self {
        Self {
            from: crate::constants::SOURCE_NAME.into(),
            version: version.into(),
            mode,
            ip: None,
        }
    }
}

/// One structured log call, as serialized over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Wall-clock milliseconds at creation.
    pub timestamp: i64,
    /// Host simulation tick, or `-1` when the host has no tick source.
    pub tick: i64,
    pub level: Level,
    pub message: String,
    /// Caller-supplied context; `{}` by default.
    #[serde(default = "empty_context")]
    pub context: Value,
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

fn empty_context() -> Value {
    Value::Object(serde_json::Map::new())
}
