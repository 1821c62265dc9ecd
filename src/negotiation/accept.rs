//! Accept-header parsing.

/// One entry of an `Accept*` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptEntry {
    pub value: String,
    pub quality: f32,
}

/// Parse an `Accept*` header into entries sorted by descending quality.
///
/// Only the `q` parameter is read; other parameters are dropped. The sort is
/// stable so entries of equal quality keep header order.
pub fn parse_accept(header: &str) -> Vec<AcceptEntry> {
    let mut entries: Vec<AcceptEntry> = header
        .split(',')
        .filter_map(|raw| {
            let mut pieces = raw.split(';');
            let value = pieces.next()?.trim();
            if value.is_empty() {
                return None;
            }
            let quality = pieces
                .filter_map(|param| {
                    let (name, value) = param.split_once('=')?;
                    if name.trim().eq_ignore_ascii_case("q") {
                        value.trim().parse::<f32>().ok()
                    } else {
                        None
                    }
                })
                .next()
                .unwrap_or(1.0);
            Some(AcceptEntry {
                value: value.to_string(),
                quality: if quality.is_nan() { 0.0 } else { quality.clamp(0.0, 1.0) },
            })
        })
        .collect();

    entries.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(entries: &[AcceptEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.value.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_quality_stable() {
        let entries = parse_accept("text/html;q=0.5, application/json, text/plain;q=0.5, */*;q=0.1");
        assert_eq!(
            values(&entries),
            vec!["application/json", "text/html", "text/plain", "*/*"]
        );
        assert_eq!(entries[0].quality, 1.0);
        assert_eq!(entries[3].quality, 0.1);
    }

    #[test]
    fn test_other_parameters_ignored() {
        let entries = parse_accept("text/html;level=1;q=0.7 , text/plain; charset=utf-8");
        assert_eq!(values(&entries), vec!["text/plain", "text/html"]);
        assert_eq!(entries[1].quality, 0.7);
    }

    #[test]
    fn test_malformed_quality_defaults() {
        let entries = parse_accept("gzip;q=abc, br;q=2, ,deflate;q=-1");
        assert_eq!(values(&entries), vec!["gzip", "br", "deflate"]);
        assert_eq!(entries[1].quality, 1.0);
        assert_eq!(entries[2].quality, 0.0);
    }
}
