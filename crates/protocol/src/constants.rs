//! Shared protocol constants.

use std::time::Duration;

/// Default port the log server listens on.
pub const DEFAULT_PORT: u16 = 3000;

/// Liveness probe endpoint.
pub const PING_PATH: &str = "/ping";

/// Log ingestion endpoint.
pub const LOG_PATH: &str = "/log";

/// Fixed response body for the liveness probe.
pub const PONG_BODY: &str = "pong";

/// Timeout for probe and delivery requests.
///
/// Kept short so a down server never stalls the host's tick loop; a
/// timed-out request counts as a failed one.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(200);

/// Value of `_meta.from` on every event.
pub const SOURCE_NAME: &str = "endbug";

/// Prefix for in-world chat broadcasts (`§7` grey, `§r` reset).
pub const CHAT_PREFIX: &str = "\u{a7}7[endbug] \u{a7}r";

/// Tick value reported when the host has no tick source.
pub const TICK_UNAVAILABLE: i64 = -1;

/// Context substituted when the caller's context cannot be serialized.
pub const UNSERIALIZABLE_CONTEXT: (&str, &str) = ("__error", "Unserializable context object");
