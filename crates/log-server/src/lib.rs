//! HTTP log ingestion server for the endbug logger client.
//!
//! Receives structured [`LogEvent`](endbug_protocol::LogEvent)s over HTTP,
//! validates and size-limits them, and renders them to the operator
//! console. Also serves the `/ping` liveness probe the client uses for
//! mode negotiation.

mod config;
mod routes;
mod server;

pub use config::{ConfigError, DEFAULT_CONFIG_FILE, FileConfig, Overrides, ServerConfig, load_file};
pub use routes::router;
pub use server::{LogServer, ServerError};
