//! `Accept-Language` resolution.

use std::fmt;
use std::sync::Arc;

use http::header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE};

use crate::config::I18nConfig;
use crate::http::Request;
use crate::middleware::pipeline::{BoxHandler, Handler, Middleware};
use crate::negotiation::{LanguageNegotiator, QualityValues};

/// Request attribute holding the negotiated language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Negotiates the request locale and labels the response with it unless the
/// handler chose a `Content-Language` of its own.
#[derive(Debug, Clone)]
pub struct LocaleMiddleware {
    negotiator: Arc<LanguageNegotiator>,
}

impl LocaleMiddleware {
    pub fn new(negotiator: LanguageNegotiator) -> Self {
        Self {
            negotiator: Arc::new(negotiator),
        }
    }

    pub fn from_config(config: &I18nConfig) -> Self {
        Self::new(LanguageNegotiator::new(
            config.languages.iter().cloned(),
            config.default_locale.clone(),
        ))
    }
}

impl Middleware for LocaleMiddleware {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        let negotiator = self.negotiator.clone();
        Arc::new(move |mut req: Request| {
            let accepted = QualityValues::from_header_values(req.headers().get_all(ACCEPT_LANGUAGE));
            let locale = negotiator.negotiate_parsed(&accepted).to_string();

            req.insert_attribute(Locale(locale.clone()));
            let mut resp = next.call(req);
            if resp.header(CONTENT_LANGUAGE).is_none() {
                resp.set_header(CONTENT_LANGUAGE, &locale);
            }
            resp
        })
    }
}
