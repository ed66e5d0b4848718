//! Quality-value (`q=`) header parsing.
//!
//! Parses comma-separated `value;q=weight` lists such as `Accept-Encoding`
//! and `Accept-Language` into entries ranked by descending weight.

use http::header::{GetAll, HeaderValue};

/// Weight assumed when an entry carries no usable `q` parameter.
pub const DEFAULT_QUALITY: f32 = 1.0;

/// A single weighted header value.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderEntry {
    pub value: String,
    pub quality: f32,
}

impl HeaderEntry {
    pub fn new(value: impl Into<String>, quality: f32) -> Self {
        Self {
            value: value.into(),
            quality,
        }
    }

    /// True when the client explicitly refuses this value (`q=0`).
    pub fn is_refused(&self) -> bool {
        self.quality <= 0.0
    }
}

/// Parsed form of a weighted header.
///
/// Entries are sorted by quality, highest first. Entries with the same
/// quality keep the order in which they appeared in the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityValues {
    entries: Vec<HeaderEntry>,
}

impl QualityValues {
    /// Parse a raw header string. Never fails: malformed weights fall back
    /// to [`DEFAULT_QUALITY`] and empty items are skipped.
    pub fn parse(header: &str) -> Self {
        let mut entries: Vec<HeaderEntry> = split_unquoted(header, ',')
            .into_iter()
            .filter_map(parse_entry)
            .collect();

        // `sort_by` is stable, ties keep header order.
        entries.sort_by(|a, b| b.quality.total_cmp(&a.quality));

        Self { entries }
    }

    /// Parse every occurrence of a header, treating them as one
    /// comma-joined list.
    pub fn from_header_values(values: GetAll<'_, HeaderValue>) -> Self {
        let joined = values
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");
        Self::parse(&joined)
    }

    /// All entries, ranked.
    pub fn entries(&self) -> &[HeaderEntry] {
        &self.entries
    }

    /// Ranked values the client accepts (quality above zero).
    pub fn values(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.is_refused())
            .map(|e| e.value.as_str())
            .collect()
    }

    /// First entry whose value equals `value`, ignoring ASCII case.
    pub fn find(&self, value: &str) -> Option<&HeaderEntry> {
        self.entries
            .iter()
            .find(|e| e.value.eq_ignore_ascii_case(value))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn parse_entry(item: &str) -> Option<HeaderEntry> {
    let mut parts = split_unquoted(item, ';').into_iter();
    let value = unquote(parts.next()?.trim());
    if value.is_empty() {
        return None;
    }

    let quality = parts
        .filter_map(|param| {
            let (key, raw) = param.split_once('=')?;
            key.trim().eq_ignore_ascii_case("q").then(|| parse_quality(raw))
        })
        .next()
        .unwrap_or(DEFAULT_QUALITY);

    Some(HeaderEntry::new(value, quality))
}

fn parse_quality(raw: &str) -> f32 {
    match raw.trim().parse::<f32>() {
        Ok(q) if (0.0..=1.0).contains(&q) => q,
        _ => DEFAULT_QUALITY,
    }
}

/// Split on `delim`, ignoring delimiters inside double quotes.
fn split_unquoted(input: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (idx, ch) in input.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim && !in_quotes => {
                parts.push(&input[start..idx]);
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}
