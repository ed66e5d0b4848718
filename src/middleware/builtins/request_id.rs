//! Request ID assignment.

use std::fmt;
use std::sync::Arc;

use http::HeaderName;
use uuid::Uuid;

use crate::config::ObservabilityConfig;
use crate::http::Request;
use crate::middleware::pipeline::{BoxHandler, Handler, Middleware};

const DEFAULT_HEADER: &str = "x-request-id";

/// Request attribute holding the request's correlation ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reuses the client's request ID header or mints a UUID v4, and echoes the
/// ID on the response.
#[derive(Debug, Clone)]
pub struct RequestIdMiddleware {
    header: HeaderName,
}

impl RequestIdMiddleware {
    /// An invalid header name falls back to `x-request-id`.
    pub fn new(header: &str) -> Self {
        let header = HeaderName::from_bytes(header.as_bytes()).unwrap_or_else(|_| {
            tracing::warn!(header, "Invalid request id header name, using default");
            HeaderName::from_static(DEFAULT_HEADER)
        });
        Self { header }
    }

    pub fn from_config(config: &ObservabilityConfig) -> Self {
        Self::new(&config.request_id_header)
    }
}

impl Default for RequestIdMiddleware {
    fn default() -> Self {
        Self {
            header: HeaderName::from_static(DEFAULT_HEADER),
        }
    }
}

impl Middleware for RequestIdMiddleware {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        let header = self.header.clone();
        Arc::new(move |mut req: Request| {
            let id = req
                .header(&header)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            req.insert_attribute(RequestId(id.clone()));
            let mut resp = next.call(req);
            if resp.header(&header).is_none() {
                resp.set_header(header.clone(), &id);
            }
            resp
        })
    }
}
