//! Response compression.
//!
//! # Responsibilities
//! - Negotiate `Accept-Encoding` against the configured encodings
//! - Compress large enough bodies with gzip or deflate
//!
//! # Design Decisions
//! - `Vary: Accept-Encoding` is added to every response, compressed or not
//! - A response that already carries `Content-Encoding` is left alone
//! - `deflate` means the zlib format, as HTTP defines it

use std::io::{self, Write};
use std::sync::Arc;

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, VARY};
use http::StatusCode;

use crate::config::CompressionConfig;
use crate::http::{Request, Response};
use crate::middleware::pipeline::{BoxHandler, Handler, Middleware};
use crate::negotiation::{encoding, QualityValues};

/// Request attribute holding the negotiated encoding; `None` when the
/// client accepts none of the configured encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedEncoding(pub Option<String>);

#[derive(Debug, Clone)]
pub struct CompressionMiddleware {
    encodings: Arc<Vec<String>>,
    min_size: usize,
    level: u32,
}

impl CompressionMiddleware {
    pub fn new(encodings: Vec<String>, min_size: usize, level: u32) -> Self {
        Self {
            encodings: Arc::new(encodings),
            min_size,
            level: level.min(9),
        }
    }

    pub fn from_config(config: &CompressionConfig) -> Self {
        Self::new(config.encodings.clone(), config.min_size, config.level)
    }
}

impl Default for CompressionMiddleware {
    fn default() -> Self {
        Self::from_config(&CompressionConfig::default())
    }
}

impl Middleware for CompressionMiddleware {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        let this = self.clone();
        Arc::new(move |mut req: Request| {
            let candidates: Vec<&str> = this.encodings.iter().map(String::as_str).collect();
            let accepted = QualityValues::from_header_values(req.headers().get_all(ACCEPT_ENCODING));
            let chosen = encoding::select_from(&accepted, &candidates).map(str::to_string);

            req.insert_attribute(NegotiatedEncoding(chosen.clone()));
            let mut resp = next.call(req);
            resp.append_header(VARY, "Accept-Encoding");

            if let Some(coding) = chosen {
                this.compress(&mut resp, &coding);
            }
            resp
        })
    }
}

impl CompressionMiddleware {
    fn compress(&self, resp: &mut Response, coding: &str) {
        if resp.header(CONTENT_ENCODING).is_some()
            || resp.body().len() < self.min_size
            || resp.body().is_empty()
            || matches!(resp.status(), StatusCode::NO_CONTENT | StatusCode::NOT_MODIFIED)
        {
            return;
        }

        match encode(coding, resp.body(), self.level) {
            Ok(Some(compressed)) => {
                resp.set_body(compressed);
                resp.set_header(CONTENT_ENCODING, coding);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(coding, error = %e, "Response compression failed, sending identity");
            }
        }
    }
}

/// Encode `data` with `coding`. `Ok(None)` for `identity` and anything
/// this module cannot produce.
pub fn encode(coding: &str, data: &[u8], level: u32) -> io::Result<Option<Vec<u8>>> {
    let level = Compression::new(level);
    if coding.eq_ignore_ascii_case("gzip") {
        let mut encoder = GzEncoder::new(Vec::new(), level);
        encoder.write_all(data)?;
        Ok(Some(encoder.finish()?))
    } else if coding.eq_ignore_ascii_case("deflate") {
        let mut encoder = ZlibEncoder::new(Vec::new(), level);
        encoder.write_all(data)?;
        Ok(Some(encoder.finish()?))
    } else {
        Ok(None)
    }
}
