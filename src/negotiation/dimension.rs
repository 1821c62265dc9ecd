//! Negotiation dimensions and their scoring rules.

use serde::Serialize;

use crate::negotiation::accept::{parse_accept, AcceptEntry};

/// Score of an incompatible pair.
const INCOMPATIBLE: f32 = -1.0;

/// One axis of content negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    MediaType,
    Language,
    Version,
    Encoding,
}

impl Dimension {
    /// All dimensions in negotiation order.
    pub const ALL: [Dimension; 4] = [
        Dimension::MediaType,
        Dimension::Language,
        Dimension::Version,
        Dimension::Encoding,
    ];

    /// Request header carrying the client's preferences (lower-case).
    pub fn header(self) -> &'static str {
        match self {
            Dimension::MediaType => "accept",
            Dimension::Language => "accept-language",
            Dimension::Version => "accept-version",
            Dimension::Encoding => "accept-encoding",
        }
    }

    /// Response header listing the server's options on a 406.
    pub fn available_header(self) -> &'static str {
        match self {
            Dimension::MediaType => "available-media-types",
            Dimension::Language => "available-languages",
            Dimension::Version => "available-versions",
            Dimension::Encoding => "available-encodings",
        }
    }

    /// Human-readable plural, used in explanations.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::MediaType => "media types",
            Dimension::Language => "languages",
            Dimension::Version => "versions",
            Dimension::Encoding => "encodings",
        }
    }

    /// Score an accepted entry against one available option.
    ///
    /// Returns a negative value when incompatible, otherwise the entry's
    /// quality (plus one for an exact language-variant match).
    pub fn score(self, accepted: &AcceptEntry, available: &str) -> f32 {
        if accepted.quality <= 0.0 {
            return INCOMPATIBLE;
        }
        let value = accepted.value.as_str();
        let q = accepted.quality;
        match self {
            Dimension::MediaType => score_media_type(value, available, q),
            Dimension::Language => score_language(value, available, q),
            Dimension::Version => {
                if value == "*" || value.eq_ignore_ascii_case(available.trim()) {
                    q
                } else {
                    INCOMPATIBLE
                }
            }
            Dimension::Encoding => {
                if value == "*" || canonical_encoding(value) == canonical_encoding(available) {
                    q
                } else {
                    INCOMPATIBLE
                }
            }
        }
    }

    /// A `q=0` entry explicitly refuses every option it would otherwise match.
    fn refuses(self, entry: &AcceptEntry, option: &str) -> bool {
        if entry.quality > 0.0 {
            return false;
        }
        let positive = AcceptEntry {
            value: entry.value.clone(),
            quality: 1.0,
        };
        self.score(&positive, option) >= 0.0
    }

    /// Pick an option from `available` for the given request header.
    ///
    /// No header (or a blank one) yields the first available option. Otherwise
    /// the first option reaching the highest score wins; `None` when nothing
    /// is compatible or `available` is empty.
    pub fn negotiate(self, header: Option<&str>, available: &[String]) -> Option<String> {
        let first = available.first()?;
        let header = match header.map(str::trim) {
            Some(h) if !h.is_empty() => h,
            _ => return Some(first.clone()),
        };

        let accepted = parse_accept(header);
        let mut winner: Option<(&String, f32)> = None;
        for option in available {
            if accepted.iter().any(|entry| self.refuses(entry, option)) {
                continue;
            }
            let score = accepted
                .iter()
                .map(|entry| self.score(entry, option))
                .fold(INCOMPATIBLE, f32::max);
            if score >= 0.0 && winner.map_or(true, |(_, best)| score > best) {
                winner = Some((option, score));
            }
        }
        winner.map(|(option, _)| option.clone())
    }
}

fn score_media_type(accepted: &str, available: &str, q: f32) -> f32 {
    let (accepted_type, accepted_sub) = split_media_type(accepted);
    let (available_type, available_sub) = split_media_type(available);
    if wildcard_eq(accepted_type, available_type) && wildcard_eq(accepted_sub, available_sub) {
        q
    } else {
        INCOMPATIBLE
    }
}

fn split_media_type(value: &str) -> (&str, &str) {
    let essence = value.split(';').next().unwrap_or("").trim();
    essence.split_once('/').unwrap_or((essence, "*"))
}

fn wildcard_eq(a: &str, b: &str) -> bool {
    a == "*" || b == "*" || a.trim().eq_ignore_ascii_case(b.trim())
}

fn score_language(accepted: &str, available: &str, q: f32) -> f32 {
    if accepted == "*" {
        return q;
    }
    let (accepted_primary, accepted_variant) = split_language(accepted);
    let (available_primary, available_variant) = split_language(available);
    if !accepted_primary.eq_ignore_ascii_case(available_primary) {
        return INCOMPATIBLE;
    }
    match (accepted_variant, available_variant) {
        (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => q + 1.0,
        _ => q,
    }
}

fn split_language(tag: &str) -> (&str, Option<&str>) {
    match tag.trim().split_once(['-', '_']) {
        Some((primary, variant)) => (primary, Some(variant)),
        None => (tag.trim(), None),
    }
}

fn canonical_encoding(value: &str) -> String {
    let value = value.trim().to_ascii_lowercase();
    if value == "brotli" {
        "br".to_string()
    } else {
        value
    }
}

/// Values chosen for each negotiated dimension of the matched route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Negotiated {
    pub media_type: Option<String>,
    pub language: Option<String>,
    pub version: Option<String>,
    pub encoding: Option<String>,
}

impl Negotiated {
    pub fn get(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::MediaType => self.media_type.as_deref(),
            Dimension::Language => self.language.as_deref(),
            Dimension::Version => self.version.as_deref(),
            Dimension::Encoding => self.encoding.as_deref(),
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: String) {
        let slot = match dimension {
            Dimension::MediaType => &mut self.media_type,
            Dimension::Language => &mut self.language,
            Dimension::Version => &mut self.version,
            Dimension::Encoding => &mut self.encoding,
        };
        *slot = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_media_type_by_quality() {
        let picked = Dimension::MediaType.negotiate(
            Some("application/json;q=0.9, text/html;q=0.8"),
            &options(&["text/html", "application/json"]),
        );
        assert_eq!(picked.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_media_type_wildcards() {
        let available = options(&["application/json", "text/html"]);
        assert_eq!(
            Dimension::MediaType.negotiate(Some("text/*"), &available).as_deref(),
            Some("text/html")
        );
        assert_eq!(
            Dimension::MediaType.negotiate(Some("*/*"), &available).as_deref(),
            Some("application/json")
        );
        assert_eq!(
            Dimension::MediaType.negotiate(Some("image/png"), &available),
            None
        );
    }

    #[test]
    fn test_tie_goes_to_server_order() {
        let picked = Dimension::MediaType.negotiate(
            Some("text/html, application/json"),
            &options(&["application/json", "text/html"]),
        );
        assert_eq!(picked.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_language_primary_match_beats_lower_exact() {
        let picked = Dimension::Language.negotiate(
            Some("en-US;q=1, fr;q=0.5"),
            &options(&["fr", "en"]),
        );
        assert_eq!(picked.as_deref(), Some("en"));
    }

    #[test]
    fn test_language_variant_bonus() {
        let picked = Dimension::Language.negotiate(
            Some("en-US"),
            &options(&["en-GB", "en-US"]),
        );
        assert_eq!(picked.as_deref(), Some("en-US"));
        assert_eq!(
            Dimension::Language.negotiate(Some("de"), &options(&["en", "fr"])),
            None
        );
    }

    #[test]
    fn test_missing_header_uses_first_option() {
        let picked = Dimension::Encoding.negotiate(None, &options(&["br", "gzip"]));
        assert_eq!(picked.as_deref(), Some("br"));
        let picked = Dimension::Encoding.negotiate(Some("  "), &options(&["br", "gzip"]));
        assert_eq!(picked.as_deref(), Some("br"));
        assert_eq!(Dimension::Encoding.negotiate(None, &[]), None);
    }

    #[test]
    fn test_brotli_synonym() {
        assert_eq!(
            Dimension::Encoding
                .negotiate(Some("brotli"), &options(&["gzip", "br"]))
                .as_deref(),
            Some("br")
        );
        assert_eq!(
            Dimension::Encoding
                .negotiate(Some("br"), &options(&["brotli"]))
                .as_deref(),
            Some("brotli")
        );
    }

    #[test]
    fn test_zero_quality_refuses() {
        assert_eq!(
            Dimension::Encoding.negotiate(Some("gzip;q=0"), &options(&["gzip"])),
            None
        );
        assert_eq!(
            Dimension::Version
                .negotiate(Some("2;q=0, *;q=0.5"), &options(&["2", "1"]))
                .as_deref(),
            Some("1")
        );
    }

    #[test]
    fn test_negotiated_slots() {
        let mut n = Negotiated::default();
        n.set(Dimension::Language, "fr".into());
        assert_eq!(n.get(Dimension::Language), Some("fr"));
        assert_eq!(n.get(Dimension::MediaType), None);
    }
}
