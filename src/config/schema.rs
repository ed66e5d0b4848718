//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server
//! core. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Session store and session cookie settings.
    pub session: SessionConfig,

    /// Supported languages for locale negotiation.
    pub i18n: I18nConfig,

    /// Response compression settings.
    pub compression: CompressionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id.
    pub cookie_name: String,

    /// Seconds of inactivity before a session expires (-1 = never).
    pub max_age_secs: i64,

    /// Interval between sweeps of expired sessions.
    pub housekeeping_interval_secs: u64,

    /// Length of generated session ids.
    pub id_length: usize,

    /// Mark the session cookie `Secure`.
    pub cookie_secure: bool,

    /// Mark the session cookie `HttpOnly`.
    pub cookie_http_only: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "JSESSIONID".to_string(),
            max_age_secs: 1800,
            housekeeping_interval_secs: 60,
            id_length: 32,
            cookie_secure: false,
            cookie_http_only: true,
        }
    }
}

/// Internationalization configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct I18nConfig {
    /// Supported language tags, e.g. `["en", "fr-CA"]`.
    pub languages: Vec<String>,

    /// Locale used when nothing in `Accept-Language` matches.
    pub default_locale: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            default_locale: "en".to_string(),
        }
    }
}

/// Compression configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CompressionConfig {
    /// Enable response compression.
    pub enabled: bool,

    /// Encodings the server offers, in server preference order.
    pub encodings: Vec<String>,

    /// Bodies smaller than this many bytes are sent as-is.
    pub min_size: usize,

    /// Compression level, 0 (none) to 9 (best).
    pub level: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            encodings: vec![
                "gzip".to_string(),
                "deflate".to_string(),
                "identity".to_string(),
            ],
            min_size: 1024,
            level: 6,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Header carrying the request ID in both directions.
    pub request_id_header: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            request_id_header: "x-request-id".to_string(),
        }
    }
}
