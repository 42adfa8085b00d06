//! HTTP capability injected into the logger.
//!
//! Mirrors the request primitive the game host exposes: method, URL,
//! headers, body, and a per-request timeout. [`ReqwestTransport`] is the
//! default implementation for hosts that allow real sockets; tests swap in
//! a mock.

use std::time::Duration;

use async_trait::async_trait;

use crate::CapabilityError;

/// HTTP method, restricted to what the logger needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A single outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// A GET with no headers or body.
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout,
        }
    }

    /// A POST carrying a JSON body.
    pub fn post_json(url: impl Into<String>, body: String, timeout: Duration) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: Some(body),
            timeout,
        }
    }
}

/// Response as far as the logger cares: the status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Network-request primitive supplied by the host.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, CapabilityError>;
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, CapabilityError> {
        let mut builder = match req.method {
            HttpMethod::Get => self.client.get(&req.url),
            HttpMethod::Post => self.client.post(&req.url),
        };
        builder = builder.timeout(req.timeout);
        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CapabilityError::Timeout
            } else {
                CapabilityError::Request(e.to_string())
            }
        })?;

        Ok(HttpResponse {
            status: response.status().as_u16(),
        })
    }
}
