//! `Accept-Encoding` negotiation.

use super::quality::{HeaderEntry, QualityValues};

pub const IDENTITY: &str = "identity";
const WILDCARD: &str = "*";

/// Pick the content coding to apply to a response.
///
/// Client entries are walked from highest to lowest quality. A named entry
/// selects the matching candidate; a `*` entry selects the first candidate
/// (in server order) the client did not name explicitly. `identity` is
/// acceptable at quality 1 unless the client refuses it with
/// `identity;q=0`, or with `*;q=0` and no `identity` entry.
///
/// Returns `None` when nothing is acceptable, in which case the response
/// must be sent without any coding applied.
pub fn select_best_encoding<'a>(header: &str, candidates: &[&'a str]) -> Option<&'a str> {
    select_from(&QualityValues::parse(header), candidates)
}

/// Same as [`select_best_encoding`] over an already-parsed header.
pub fn select_from<'a>(accepted: &QualityValues, candidates: &[&'a str]) -> Option<&'a str> {
    if candidates.is_empty() {
        return None;
    }

    for entry in ranked_with_implicit_identity(accepted) {
        if entry.is_refused() {
            // Remaining entries are refused too.
            break;
        }

        if entry.value == WILDCARD {
            let unnamed = candidates
                .iter()
                .copied()
                .find(|c| accepted.find(c).is_none());
            if unnamed.is_some() {
                return unnamed;
            }
            continue;
        }

        if let Some(candidate) = candidates
            .iter()
            .copied()
            .find(|c| c.eq_ignore_ascii_case(&entry.value))
        {
            return Some(candidate);
        }
    }

    None
}

/// The client's entries plus `identity;q=1` unless the header names
/// `identity` or refuses `*`. The implicit entry goes after every explicit
/// entry of quality 1, so a positive `*` still outranks it.
fn ranked_with_implicit_identity(accepted: &QualityValues) -> Vec<HeaderEntry> {
    let mut entries = accepted.entries().to_vec();
    let wildcard_refused = accepted.find(WILDCARD).is_some_and(HeaderEntry::is_refused);
    if accepted.find(IDENTITY).is_none() && !wildcard_refused {
        let pos = entries
            .iter()
            .position(|e| e.quality < 1.0)
            .unwrap_or(entries.len());
        entries.insert(pos, HeaderEntry::new(IDENTITY, 1.0));
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_candidates() {
        assert_eq!(select_best_encoding("", &[]), None);
    }

    #[test]
    fn test_higher_quality_wins() {
        assert_eq!(
            select_best_encoding("compress; q=0.5, gzip", &["compress", "gzip"]),
            Some("gzip")
        );
    }

    #[test]
    fn test_client_order_breaks_named_ties() {
        assert_eq!(
            select_best_encoding("gzip, deflate", &["deflate", "gzip"]),
            Some("gzip")
        );
    }

    #[test]
    fn test_refused_and_unknown_yield_none() {
        assert_eq!(
            select_best_encoding("compress, deflate; q=0", &["gzip", "deflate"]),
            None
        );
    }

    #[test]
    fn test_identity_is_implicit() {
        assert_eq!(select_best_encoding("", &["gzip", "identity"]), Some("identity"));
        assert_eq!(select_best_encoding("deflate, gzip", &["identity"]), Some("identity"));
        assert_eq!(
            select_best_encoding("deflate; q=0, gzip; q=0", &["gzip", "deflate", "identity"]),
            Some("identity")
        );
    }

    #[test]
    fn test_explicit_identity_overrides_wildcard_refusal() {
        assert_eq!(
            select_best_encoding("*; q=0, identity; q=0.1", &["gzip", "deflate", "identity"]),
            Some("identity")
        );
    }

    #[test]
    fn test_identity_refused() {
        assert_eq!(select_best_encoding("identity; q=0", &["identity"]), None);
        assert_eq!(select_best_encoding("*; q=0", &["identity"]), None);
    }

    #[test]
    fn test_wildcard_takes_first_candidate() {
        assert_eq!(
            select_best_encoding("*", &["gzip", "deflate", "identity"]),
            Some("gzip")
        );
    }

    #[test]
    fn test_wildcard_skips_explicitly_named_candidates() {
        assert_eq!(
            select_best_encoding("gzip; q=0.9, *", &["gzip", "deflate", "compress"]),
            Some("deflate")
        );
    }

    #[test]
    fn test_implicit_identity_beats_lower_quality_codings() {
        assert_eq!(
            select_best_encoding("gzip;q=0.5", &["gzip", "identity"]),
            Some("identity")
        );
    }

    #[test]
    fn test_positive_wildcard_keeps_implicit_identity() {
        assert_eq!(
            select_best_encoding("gzip;q=0.5, *;q=0.3", &["gzip", "identity"]),
            Some("identity")
        );
        assert_eq!(
            select_best_encoding("*;q=0.3", &["gzip", "identity"]),
            Some("identity")
        );
        assert_eq!(select_best_encoding("*;q=0.3", &["gzip"]), Some("gzip"));
    }

    #[test]
    fn test_names_match_case_insensitively() {
        assert_eq!(select_best_encoding("GZIP", &["deflate", "gzip"]), Some("gzip"));
    }
}
