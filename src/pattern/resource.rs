//! Resource patterns: `path?query#fragment` as one matcher.
//!
//! # Responsibilities
//! - Split a resource pattern at the first unescaped `?` and `#`
//! - Match the decoded path, each declared query parameter and the fragment
//! - Compose the captures of all three parts
//!
//! # Design Decisions
//! - Query parameters are matched independently by name; undeclared
//!   parameters in the request are ignored
//! - Path decoding keeps reserved characters escaped (`%2F` stays `%2F`,
//!   hex digits upper-cased)
//! - An escaped `\?` or `\#` in the path compiles to `%3F` / `%23`, the only
//!   form in which a request path can carry them

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use url::form_urlencoded;

use crate::pattern::captures::Captures;
use crate::pattern::compiler::{CompileOptions, Pattern, PatternError};

/// Characters `decodeURI`-style decoding leaves escaped.
const RESERVED: &[u8] = b";/?:@&=+$,#";

/// One `name=value` pattern of the query part.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QueryParam {
    name: String,
    value: Pattern,
}

/// A compiled resource pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePattern {
    source: String,
    path: Pattern,
    query: Vec<QueryParam>,
    fragment: Option<Pattern>,
}

impl ResourcePattern {
    pub fn compile(source: &str) -> Self {
        let (path, query, fragment) = split_unescaped(source);

        let query = query
            .map(|q| {
                q.split('&')
                    .filter(|pair| !pair.is_empty())
                    .map(|pair| {
                        let (name, value) = pair.split_once('=').unwrap_or((pair, "*"));
                        QueryParam {
                            name: name.to_string(),
                            value: Pattern::compile(value, CompileOptions::delimited('&')),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            source: source.to_string(),
            path: Pattern::compile(&encode_escaped_delimiters(path), CompileOptions::delimited('/')),
            query,
            fragment: fragment.map(|f| Pattern::compile(f, CompileOptions::delimited('&'))),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> &Pattern {
        &self.path
    }

    /// Match a request resource (`path?query#fragment`).
    pub fn matches(&self, resource: &str) -> Option<Captures> {
        let (path, query, fragment) = split_resource(resource);

        let decoded = decode_uri(path)?;
        let mut captures = self.path.matches(&decoded)?;

        if !self.query.is_empty() {
            let actual: HashMap<String, String> = form_urlencoded::parse(query.unwrap_or("").as_bytes())
                .into_owned()
                .collect();
            for param in &self.query {
                let value = actual.get(&param.name)?;
                captures.merge(param.value.matches(value)?);
            }
        }

        if let Some(pattern) = &self.fragment {
            captures.merge(pattern.matches(fragment.unwrap_or(""))?);
        }

        Some(captures)
    }

    /// True when a path beginning with `prefix` could still match.
    pub fn could_match_under(&self, prefix: &str) -> bool {
        self.path.could_match_under(prefix)
    }

    /// Render path, query and fragment with the supplied values.
    pub fn generate(&self, values: &Captures) -> Result<String, PatternError> {
        let mut out = self.path.generate(values)?;
        if !self.query.is_empty() {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for param in &self.query {
                serializer.append_pair(&param.name, &param.value.generate(values)?);
            }
            out.push('?');
            out.push_str(&serializer.finish());
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(&fragment.generate(values)?);
        }
        Ok(out)
    }

    pub fn generate_example(&self) -> String {
        let mut out = self.path.generate_example();
        if !self.query.is_empty() {
            let pairs: Vec<String> = self
                .query
                .iter()
                .map(|p| format!("{}={}", p.name, p.value.generate_example()))
                .collect();
            out.push('?');
            out.push_str(&pairs.join("&"));
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(&fragment.generate_example());
        }
        out
    }
}

impl fmt::Display for ResourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split a pattern at the first unescaped `?` and the first unescaped `#`.
fn split_unescaped(source: &str) -> (&str, Option<&str>, Option<&str>) {
    let bytes = source.as_bytes();
    let mut query_at = None;
    let mut fragment_at = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'?' if query_at.is_none() && fragment_at.is_none() => query_at = Some(i),
            b'#' if fragment_at.is_none() => fragment_at = Some(i),
            _ => {}
        }
        i += 1;
    }

    let path_end = query_at.or(fragment_at).unwrap_or(source.len());
    let query = query_at.map(|q| &source[q + 1..fragment_at.unwrap_or(source.len())]);
    let fragment = fragment_at.map(|f| &source[f + 1..]);
    (&source[..path_end], query, fragment)
}

/// Rewrite `\?` and `\#` to their percent-encoded form; other escapes are
/// left for the pattern compiler.
fn encode_escaped_delimiters(path: &str) -> Cow<'_, str> {
    if !path.contains("\\?") && !path.contains("\\#") {
        return Cow::Borrowed(path);
    }

    let mut out = String::with_capacity(path.len() + 4);
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('?') => out.push_str("%3F"),
            Some('#') => out.push_str("%23"),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// Split a request resource into path, query and fragment.
fn split_resource(resource: &str) -> (&str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match resource.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (resource, None),
    };
    match rest.split_once('?') {
        Some((path, query)) => (path, Some(query), fragment),
        None => (rest, None, fragment),
    }
}

/// Percent-decode a path the way `decodeURI` does. Returns `None` when the
/// decoded bytes are not UTF-8.
pub(crate) fn decode_uri(path: &str) -> Option<String> {
    if !path.contains('%') {
        return Some(path.to_string());
    }

    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                let byte = hi << 4 | lo;
                if RESERVED.contains(&byte) {
                    out.push(b'%');
                    out.push(bytes[i + 1].to_ascii_uppercase());
                    out.push(bytes[i + 2].to_ascii_uppercase());
                } else {
                    out.push(byte);
                }
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).ok()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_only() {
        let p = ResourcePattern::compile("/users/:id");
        assert_eq!(p.matches("/users/42").unwrap().get("id"), Some("42"));
        assert_eq!(p.matches("/users/42?x=1").unwrap().get("id"), Some("42"));
        assert!(p.matches("/users").is_none());
    }

    #[test]
    fn test_path_is_decoded() {
        let p = ResourcePattern::compile("/files/:name");
        assert_eq!(
            p.matches("/files/hello%20world").unwrap().get("name"),
            Some("hello world")
        );
        // an encoded slash stays inside the segment
        assert_eq!(
            p.matches("/files/a%2Fb").unwrap().get("name"),
            Some("a%2Fb")
        );
        assert!(p.matches("/files/%FF").is_none());
    }

    #[test]
    fn test_query_parameters_match_independently() {
        let p = ResourcePattern::compile("/search?q=:term&page=*");
        let c = p.matches("/search?page=2&lang=en&q=rust%20lang").unwrap();
        assert_eq!(c.get("term"), Some("rust lang"));
        assert_eq!(c.stars, vec!["2".to_string()]);

        assert!(p.matches("/search?q=rust").is_none());
        assert!(p.matches("/search").is_none());
    }

    #[test]
    fn test_bare_query_name_requires_presence() {
        let p = ResourcePattern::compile("/feed?debug");
        assert!(p.matches("/feed?debug=1").is_some());
        assert!(p.matches("/feed?verbose=1").is_none());
    }

    #[test]
    fn test_fragment() {
        let p = ResourcePattern::compile("/doc#:section");
        assert_eq!(p.matches("/doc#intro").unwrap().get("section"), Some("intro"));
        assert!(p.matches("/doc").is_none());
    }

    #[test]
    fn test_escaped_question_mark_stays_in_path() {
        let p = ResourcePattern::compile(r"/what\?#top");
        assert_eq!(p.path().source(), "/what%3F");
        assert!(p.query.is_empty());
        assert_eq!(p.fragment.as_ref().map(Pattern::source), Some("top"));

        assert!(p.matches("/what%3F#top").is_some());
        assert!(p.matches("/what%3f#top").is_some());
        assert!(p.matches("/what?#top").is_none());
    }

    #[test]
    fn test_escaped_hash_and_other_escapes_in_path() {
        let p = ResourcePattern::compile(r"/tag\#:name/\*");
        assert_eq!(p.path().source(), r"/tag%23:name/\*");
        assert_eq!(p.matches("/tag%23rust/*").unwrap().get("name"), Some("rust"));
        assert_eq!(
            p.generate(&Captures::new().with_named("name", "rust")).unwrap(),
            "/tag%23rust/*"
        );
    }

    #[test]
    fn test_generate() {
        let p = ResourcePattern::compile("/search/:scope?q=:term#*");
        let values = Captures::new()
            .with_named("scope", "docs")
            .with_named("term", "a b")
            .with_star("top");
        assert_eq!(p.generate(&values).unwrap(), "/search/docs?q=a+b#top");
        assert_eq!(p.generate_example(), "/search/scope?q=term#0");
    }
}
