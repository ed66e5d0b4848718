//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, levels in range)
//! - Check names against what the runtime supports (encodings, log formats)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::session::id::MIN_ID_LENGTH;

/// Encodings the compression middleware can produce.
pub const SUPPORTED_ENCODINGS: &[&str] = &["gzip", "deflate", "identity"];

const LOG_FORMATS: &[&str] = &["pretty", "json"];

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let session = &config.session;
    if session.cookie_name.is_empty() {
        errors.push(ValidationError::new("session.cookie_name", "must not be empty"));
    } else if !session.cookie_name.bytes().all(is_token_byte) {
        errors.push(ValidationError::new(
            "session.cookie_name",
            format!("{:?} contains characters not allowed in a cookie name", session.cookie_name),
        ));
    }
    if session.id_length < MIN_ID_LENGTH {
        errors.push(ValidationError::new(
            "session.id_length",
            format!("must be at least {}, got {}", MIN_ID_LENGTH, session.id_length),
        ));
    }
    if session.housekeeping_interval_secs == 0 {
        errors.push(ValidationError::new(
            "session.housekeeping_interval_secs",
            "must be greater than zero",
        ));
    }

    let i18n = &config.i18n;
    if i18n.languages.is_empty() {
        errors.push(ValidationError::new("i18n.languages", "must list at least one language"));
    }
    if i18n.default_locale.trim().is_empty() {
        errors.push(ValidationError::new("i18n.default_locale", "must not be blank"));
    }

    let compression = &config.compression;
    if compression.enabled && compression.encodings.is_empty() {
        errors.push(ValidationError::new(
            "compression.encodings",
            "must not be empty while compression is enabled",
        ));
    }
    for encoding in &compression.encodings {
        if !SUPPORTED_ENCODINGS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(encoding))
        {
            errors.push(ValidationError::new(
                "compression.encodings",
                format!("unsupported encoding {:?}", encoding),
            ));
        }
    }
    if compression.level > 9 {
        errors.push(ValidationError::new(
            "compression.level",
            format!("must be between 0 and 9, got {}", compression.level),
        ));
    }

    let format = &config.observability.log_format;
    if !LOG_FORMATS.iter().any(|f| f.eq_ignore_ascii_case(format)) {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("expected \"pretty\" or \"json\", got {:?}", format),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// RFC 7230 `tchar`.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(config: &ServerConfig) -> Vec<&'static str> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_problem() {
        let mut config = ServerConfig::default();
        config.session.id_length = 8;
        config.session.housekeeping_interval_secs = 0;
        config.i18n.languages.clear();
        config.compression.level = 12;

        assert_eq!(
            fields(&config),
            vec![
                "session.id_length",
                "session.housekeeping_interval_secs",
                "i18n.languages",
                "compression.level",
            ]
        );
    }

    #[test]
    fn test_error_display_names_field() {
        let mut config = ServerConfig::default();
        config.session.id_length = 4;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "session.id_length: must be at least 16, got 4"
        );
    }

    #[test]
    fn test_cookie_name_must_be_a_token() {
        let mut config = ServerConfig::default();
        config.session.cookie_name = "my session".to_string();
        assert_eq!(fields(&config), vec!["session.cookie_name"]);

        config.session.cookie_name = String::new();
        assert_eq!(fields(&config), vec!["session.cookie_name"]);
    }

    #[test]
    fn test_encodings() {
        let mut config = ServerConfig::default();
        config.compression.encodings = vec!["br".to_string()];
        assert_eq!(fields(&config), vec!["compression.encodings"]);

        config.compression.encodings.clear();
        assert_eq!(fields(&config), vec!["compression.encodings"]);

        config.compression.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_log_format_and_locale() {
        let mut config = ServerConfig::default();
        config.observability.log_format = "xml".to_string();
        config.i18n.default_locale = "  ".to_string();
        assert_eq!(
            fields(&config),
            vec!["i18n.default_locale", "observability.log_format"]
        );
    }
}
