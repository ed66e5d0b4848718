//! `Accept-Language` negotiation with primary-subtag fallback.

use super::quality::QualityValues;

/// Chooses one of a fixed, ordered set of supported language tags.
#[derive(Debug, Clone)]
pub struct LanguageNegotiator {
    supported: Vec<String>,
    default_locale: String,
    /// `default_locale` resolved against `supported` once, at construction.
    fallback: String,
}

impl LanguageNegotiator {
    /// Create a negotiator.
    ///
    /// If the default locale is not itself supported it is reduced to its
    /// primary subtag and matched the same way a client range would be.
    /// When even that fails, the default locale is returned verbatim.
    pub fn new<I, S>(supported: I, default_locale: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let supported: Vec<String> = supported.into_iter().map(Into::into).collect();
        let default_locale = default_locale.into();
        let fallback = match_range(&supported, &default_locale)
            .map(str::to_string)
            .unwrap_or_else(|| default_locale.clone());

        Self {
            supported,
            default_locale,
            fallback,
        }
    }

    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Best supported tag for an `Accept-Language` header value.
    /// `None` or an empty header selects the default locale.
    pub fn negotiate(&self, header: Option<&str>) -> &str {
        match header {
            Some(h) => self.negotiate_parsed(&QualityValues::parse(h)),
            None => self.fallback.as_str(),
        }
    }

    pub fn negotiate_parsed(&self, accepted: &QualityValues) -> &str {
        accepted
            .entries()
            .iter()
            .filter(|e| !e.is_refused())
            .find_map(|e| {
                if e.value == "*" {
                    Some(self.fallback.as_str())
                } else {
                    match_range(&self.supported, &e.value)
                }
            })
            .unwrap_or(self.fallback.as_str())
    }
}

/// Match one language range: exact (case-insensitive) first, then by
/// primary subtag, preferring a supported tag that is a bare primary subtag.
fn match_range<'a>(supported: &'a [String], range: &str) -> Option<&'a str> {
    if let Some(exact) = supported.iter().find(|t| t.eq_ignore_ascii_case(range)) {
        return Some(exact.as_str());
    }

    let primary = primary_subtag(range);
    if primary.is_empty() {
        return None;
    }

    supported
        .iter()
        .find(|t| t.eq_ignore_ascii_case(primary))
        .or_else(|| {
            supported
                .iter()
                .find(|t| primary_subtag(t).eq_ignore_ascii_case(primary))
        })
        .map(String::as_str)
}

/// Leading component of a language tag: `en` for `en-GB`.
pub fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag).trim()
}
