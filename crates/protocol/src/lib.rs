//! Wire protocol for endbug logger-to-server communication.
//!
//! The logger client serializes a [`LogEvent`] as JSON and POSTs it to the
//! log server, which injects the client address into the metadata before
//! rendering. Both sides share these types so the wire format has a single
//! definition.

pub mod constants;
mod event;

pub use event::{Level, LogEvent, Meta, Mode};
