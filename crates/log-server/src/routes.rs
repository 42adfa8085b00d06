//! Request pipeline: `GET /ping` and `POST /log`.
//!
//! Every request runs received → size-checked → parsed → rendered →
//! acknowledged, diverting to an error response at the first failed
//! checkpoint. Faults never escape a request: oversized bodies get a
//! structured 413, everything else a generic 500 with the detail kept in
//! the local log only.

use std::net::{IpAddr, SocketAddr};

use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{ConnectInfo, DefaultBodyLimit};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use colored::Colorize;
use serde_json::json;

use endbug_protocol::constants::PONG_BODY;
use endbug_protocol::{Level, LogEvent};

/// Builds the router with the body cap applied to the ingestion route.
pub fn router(max_body_bytes: usize) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/log", post(ingest).layer(DefaultBodyLimit::max(max_body_bytes)))
}

/// Liveness probe: fixed body, no validation, no side effects.
async fn ping() -> &'static str {
    PONG_BODY
}

/// Ingests one log event.
///
/// The body arrives pre-limited: buffering aborts as soon as the cap is
/// exceeded, so an oversized payload is rejected with bounded memory and
/// before JSON parsing ever starts.
async fn ingest(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(peer = %peer.ip(), "rejected oversized payload");
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                axum::Json(json!({"error": "Payload too large"})),
            )
                .into_response();
        }
        Err(rejection) => {
            tracing::error!(peer = %peer.ip(), error = %rejection, "failed to read request body");
            return internal_error();
        }
    };

    let mut event: LogEvent = match serde_json::from_slice(&bytes) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(peer = %peer.ip(), error = %e, "unexpected server error");
            return internal_error();
        }
    };

    annotate(&mut event, peer);
    render(&event);
    StatusCode::OK.into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({"error": "Internal server error"})),
    )
        .into_response()
}

/// Injects the resolved client address into the event metadata.
pub(crate) fn annotate(event: &mut LogEvent, peer: SocketAddr) {
    event.meta.ip = Some(canonical_ip(peer.ip()).to_string());
}

/// Collapses IPv4-mapped IPv6 notation (`::ffff:a.b.c.d`) to plain IPv4.
fn canonical_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_canonical(),
        v4 => v4,
    }
}

/// Renders `[level ] message` plus the raw context to the operator
/// console, colored by severity.
fn render(event: &LogEvent) {
    let tag = match event.level {
        Level::Error => level_tag(event.level).red(),
        Level::Warn => level_tag(event.level).yellow(),
        _ => level_tag(event.level).white(),
    };
    println!("{tag} {} {}", event.message.white(), event.context);
}

/// Level tag in a fixed 6-column field, so messages line up across levels.
fn level_tag(level: Level) -> String {
    format!("[{level:<6}]")
}
