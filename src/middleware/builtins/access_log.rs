//! Per-request access logging.

use std::sync::Arc;
use std::time::Instant;

use super::request_id::RequestId;
use crate::http::Request;
use crate::middleware::pipeline::{BoxHandler, Handler, Middleware};
use crate::observability::metrics;

/// Emits one `info` event per request and records request metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLogMiddleware;

impl Middleware for AccessLogMiddleware {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        Arc::new(move |req: Request| {
            let start = Instant::now();
            let method = req.method().clone();
            let path = req.path().to_string();
            let request_id = req
                .attribute::<RequestId>()
                .map(|id| id.0.clone())
                .unwrap_or_default();

            let resp = next.call(req);

            let elapsed = start.elapsed();
            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = resp.status().as_u16(),
                latency_ms = elapsed.as_millis() as u64,
                "Request completed"
            );
            metrics::record_request(resp.status(), elapsed);
            resp
        })
    }
}
