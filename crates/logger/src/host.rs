//! Capabilities supplied by the host environment.
//!
//! The game host hands these to [`Logger::new`](crate::Logger::new) at
//! construction. Whether a tick source exists is decided once there; the
//! logger never re-checks per call.

use crate::CapabilityError;

/// World-broadcast primitive (e.g. `world.sendMessage` in the game host).
pub trait Messenger: Send + Sync {
    /// Broadcasts `text` to the world.
    fn send_message(&self, text: &str) -> Result<(), CapabilityError>;
}

/// Monotonic simulation-tick accessor.
///
/// Hosts without one pass `None` to the logger, which then reports the
/// `-1` sentinel from [`Logger::tick`](crate::Logger::tick).
pub trait TickSource: Send + Sync {
    /// Current tick of the host simulation.
    fn tick(&self) -> i64;
}
