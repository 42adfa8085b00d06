//! Logger client for sandboxed game scripts.
//!
//! A [`Logger`] is constructed once per host process with the capabilities
//! the host grants it: an HTTP [`Transport`], a world [`Messenger`], and an
//! optional [`TickSource`]. It holds the enable flag and output [`Mode`],
//! probes the companion log server on [`Logger::connect`], and routes every
//! log call through the current mode.
//!
//! Nothing here returns an error to the caller: connectivity, delivery and
//! serialization failures all degrade to a local `tracing` warning so a log
//! call can never break the host's tick loop.

mod client;
mod host;
mod transport;

pub use client::Logger;
pub use host::{Messenger, TickSource};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};

pub use endbug_protocol::Mode;

/// Failure of a host capability.
///
/// Only crosses the capability traits; the [`Logger`] itself catches every
/// variant and turns it into a local warning.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("broadcast failed: {0}")]
    Broadcast(String),
}
