//! The logger client's mode state machine.
//!
//! State is two atomics so log calls on the host loop never block: reads
//! are last-mode-wins, which is fine because mode only changes on an
//! explicit [`Logger::connect`] and is idempotent to read.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use serde::Serialize;
use serde_json::Value;

use endbug_protocol::constants::{
    CHAT_PREFIX, LOG_PATH, PING_PATH, REQUEST_TIMEOUT, TICK_UNAVAILABLE, UNSERIALIZABLE_CONTEXT,
};
use endbug_protocol::{Level, LogEvent, Meta, Mode};

use crate::host::{Messenger, TickSource};
use crate::transport::{HttpRequest, Transport};

/// Logger client embedded in the game host.
///
/// One instance per host process; call sites receive a shared reference
/// (or an `Arc`) instead of going through ambient global state.
pub struct Logger {
    enabled: AtomicBool,
    /// Current [`Mode`], stored as its wire discriminant.
    mode: AtomicU8,
    /// Base URL of the log server, e.g. `http://localhost:3000`.
    base_url: String,
    transport: Arc<dyn Transport>,
    messenger: Arc<dyn Messenger>,
    /// Decided once at construction; `None` means the `-1` sentinel.
    tick_source: Option<Arc<dyn TickSource>>,
}

impl Logger {
    /// Creates a disabled logger in [`Mode::Console`].
    ///
    /// `tick_source` is `None` for hosts without a tick accessor; the
    /// logger then reports `-1` and never re-checks.
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        messenger: Arc<dyn Messenger>,
        tick_source: Option<Arc<dyn TickSource>>,
    ) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            mode: AtomicU8::new(mode_to_u8(Mode::default())),
            base_url: base_url.into(),
            transport,
            messenger,
            tick_source,
        }
    }

    /// Enables log output. Idempotent.
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Disables log output. Idempotent; disabled is the initial state.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn mode(&self) -> Mode {
        mode_from_u8(self.mode.load(Ordering::Relaxed))
    }

    /// Current host tick, or `-1` without a tick source.
    pub fn tick(&self) -> i64 {
        self.tick_source
            .as_ref()
            .map(|t| t.tick())
            .unwrap_or(TICK_UNAVAILABLE)
    }

    /// Checks whether the log server is reachable.
    ///
    /// True only on an explicit 200 from `/ping` within the probe timeout;
    /// any error, timeout or other status is false. Never errors out.
    pub async fn probe(&self) -> bool {
        let req = HttpRequest::get(format!("{}{PING_PATH}", self.base_url), REQUEST_TIMEOUT);
        match self.transport.request(req).await {
            Ok(resp) => resp.is_success(),
            Err(_) => false,
        }
    }

    /// Probes the server and selects the output mode.
    ///
    /// Reachable selects [`Mode::External`], otherwise [`Mode::Console`]
    /// with a local fallback notice. This is the only operation that moves
    /// the mode; delivery failures later never flip it back.
    pub async fn connect(&self) {
        let available = self.probe().await;
        let mode = if available {
            Mode::External
        } else {
            Mode::Console
        };
        self.mode.store(mode_to_u8(mode), Ordering::Relaxed);
        if !available {
            tracing::warn!("external debug server not detected, falling back to console mode");
        }
    }

    /// Logs at [`Level::Info`].
    pub fn log<C: Serialize>(&self, message: impl Into<String>, context: C) {
        self.dispatch(Level::Info, message.into(), Some(&context));
    }

    /// Logs at [`Level::Warn`].
    pub fn warn<C: Serialize>(&self, message: impl Into<String>, context: C) {
        self.dispatch(Level::Warn, message.into(), Some(&context));
    }

    /// Logs at [`Level::Error`].
    pub fn error<C: Serialize>(&self, message: impl Into<String>, context: C) {
        self.dispatch(Level::Error, message.into(), Some(&context));
    }

    /// Logs at [`Level::Say`] with no context.
    pub fn say(&self, message: impl Into<String>) {
        self.dispatch(Level::Say, message.into(), Option::<&()>::None);
    }

    /// Builds the event and routes it through the current mode.
    ///
    /// The enabled check comes first so a disabled logger does no
    /// serialization work at all.
    fn dispatch<C: Serialize>(&self, level: Level, message: String, context: Option<&C>) {
        if !self.enabled() {
            return;
        }

        let context = safe_context(context);
        let mode = self.mode();
        let event = LogEvent {
            timestamp: chrono::Utc::now().timestamp_millis(),
            tick: self.tick(),
            level,
            message,
            context,
            meta: Meta::new(env!("CARGO_PKG_VERSION"), mode),
        };

        match mode {
            Mode::External => self.deliver(event),
            Mode::Console => render_console(&event),
            Mode::Chat => {
                let text = format!("{CHAT_PREFIX}{}", event.message);
                if let Err(e) = self.messenger.send_message(&text) {
                    tracing::warn!(error = %e, "failed to send chat message");
                }
            }
            Mode::None => {}
        }
    }

    /// Fire-and-forget delivery to the log server.
    ///
    /// The result is discarded by design: a failed POST is warned about
    /// locally and dropped, with no retry and no mode change. Must run
    /// inside a tokio runtime.
    fn deliver(&self, event: LogEvent) {
        let transport = Arc::clone(&self.transport);
        let url = format!("{}{LOG_PATH}", self.base_url);
        tokio::spawn(async move {
            let body = match serde_json::to_string(&event) {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to serialize log event");
                    return;
                }
            };
            let req = HttpRequest::post_json(url, body, REQUEST_TIMEOUT);
            match transport.request(req).await {
                Ok(resp) if resp.is_success() => {}
                Ok(resp) => {
                    tracing::warn!(status = resp.status, "failed to send external log");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to send external log");
                }
            }
        });
    }
}

/// Serializes the caller's context, substituting a diagnostic placeholder
/// when it cannot be represented as JSON (cyclic or host-internal values).
fn safe_context<C: Serialize>(context: Option<&C>) -> Value {
    let Some(context) = context else {
        return Value::Object(serde_json::Map::new());
    };
    match serde_json::to_value(context) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "context could not be serialized");
            let (key, text) = UNSERIALIZABLE_CONTEXT;
            let mut placeholder = serde_json::Map::new();
            placeholder.insert(key.to_string(), Value::String(text.to_string()));
            Value::Object(placeholder)
        }
    }
}

/// Renders an event to the local operator output on the level-matching
/// channel.
fn render_console(event: &LogEvent) {
    match event.level {
        Level::Error => {
            tracing::error!(context = %event.context, "[endbug] {}", event.message);
        }
        Level::Warn => {
            tracing::warn!(context = %event.context, "[endbug] {}", event.message);
        }
        Level::Info | Level::Say => {
            tracing::info!(context = %event.context, "[endbug] {}", event.message);
        }
    }
}

fn mode_to_u8(mode: Mode) -> u8 {
    match mode {
        Mode::External => 0,
        Mode::Console => 1,
        Mode::Chat => 2,
        Mode::None => 3,
    }
}

fn mode_from_u8(raw: u8) -> Mode {
    match raw {
        0 => Mode::External,
        2 => Mode::Chat,
        3 => Mode::None,
        _ => Mode::Console,
    }
}
