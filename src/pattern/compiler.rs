//! Pattern compiler.
//!
//! Compiles a pattern string made of literal text, named captures (`:name`)
//! and wildcard captures (`*`, `**`) into a [`Pattern`] that can both match
//! and generate strings.

use std::fmt;

use thiserror::Error;

use crate::pattern::captures::Captures;
use crate::pattern::segment::{Alignment, SegmentMatcher, Token};

/// Errors raised while generating a string from a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("no value supplied for named capture `{0}`")]
    MissingNamed(String),

    #[error("no value supplied for wildcard #{0}")]
    MissingStar(usize),

    #[error("value {value:?} for `{capture}` is empty or contains {delimiter:?} and would not match back")]
    UnmatchableValue {
        capture: String,
        value: String,
        delimiter: char,
    },
}

/// Compilation options.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Character captures stop at. Defaults to `/` (end of segment).
    pub capture_delimiter: Option<char>,
}

impl CompileOptions {
    pub fn delimited(delimiter: char) -> Self {
        Self {
            capture_delimiter: Some(delimiter),
        }
    }
}

/// One part of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Static(String),
    Named(String),
    Star { index: usize, globstar: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// The lone `*` pattern: matches anything, generates its first star.
    Any,
    Segments(SegmentMatcher),
}

/// An immutable compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    parts: Vec<Part>,
    kind: Kind,
}

impl Pattern {
    pub fn compile(source: &str, options: CompileOptions) -> Self {
        if source == "*" {
            return Self {
                source: source.to_string(),
                parts: vec![Part::Star {
                    index: 0,
                    globstar: false,
                }],
                kind: Kind::Any,
            };
        }

        let separator = options
            .capture_delimiter
            .filter(char::is_ascii)
            .map_or(b'/', |c| c as u8);

        let mut parts: Vec<Part> = Vec::new();
        let mut tokens: Vec<(Token, usize)> = Vec::new();
        let mut stars = 0;
        let bytes = source.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' if i + 1 < bytes.len() => {
                    let ch_len = utf8_len(bytes[i + 1]);
                    push_literal(&mut parts, &mut tokens, &source[i + 1..i + 1 + ch_len], i);
                    i += 1 + ch_len;
                }
                b':' if bytes.get(i + 1).is_some_and(|b| is_ident_start(*b)) => {
                    let end = bytes[i + 1..]
                        .iter()
                        .position(|b| !is_ident_continue(*b))
                        .map_or(bytes.len(), |p| i + 1 + p);
                    let name = source[i + 1..end].to_string();
                    tokens.push((Token::Star(Some(name.clone())), i));
                    parts.push(Part::Named(name));
                    i = end;
                }
                b'*' => {
                    let globstar = bytes.get(i + 1) == Some(&b'*');
                    tokens.push((if globstar { Token::Globstar } else { Token::Star(None) }, i));
                    parts.push(Part::Star {
                        index: stars,
                        globstar,
                    });
                    stars += 1;
                    i += if globstar { 2 } else { 1 };
                }
                b => {
                    let ch_len = utf8_len(b);
                    push_literal(&mut parts, &mut tokens, &source[i..i + ch_len], i);
                    i += ch_len;
                }
            }
        }

        Self {
            source: source.to_string(),
            parts,
            kind: Kind::Segments(SegmentMatcher::new(tokens, source.len(), separator)),
        }
    }

    /// Compile with default options (captures stop at `/`).
    pub fn new(source: &str) -> Self {
        Self::compile(source, CompileOptions::default())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn has_captures(&self) -> bool {
        self.parts.iter().any(|p| !matches!(p, Part::Static(_)))
    }

    /// Raw alignment against the compiled tokens.
    pub fn align(&self, input: &str) -> Alignment {
        match &self.kind {
            Kind::Any => Alignment {
                matched: true,
                pattern_index: self.source.len(),
                input_index: input.len(),
                groups: Vec::new(),
            },
            Kind::Segments(segments) => segments.align(input),
        }
    }

    /// Match `input`, returning the captures on success.
    pub fn matches(&self, input: &str) -> Option<Captures> {
        if let Kind::Any = self.kind {
            return Some(Captures::new().with_star(input));
        }

        let alignment = self.align(input);
        if !alignment.matched {
            return None;
        }

        let mut captures = Captures::new();
        for group in alignment.groups {
            match group.name {
                Some(name) => {
                    captures.named.insert(name, group.value);
                }
                None => captures.stars.push(group.value),
            }
        }
        Some(captures)
    }

    /// True when some string starting with `prefix` could still match.
    pub fn could_match_under(&self, prefix: &str) -> bool {
        self.align(prefix).consumed_all(prefix)
    }

    /// Render the pattern with the supplied values.
    ///
    /// Fails when a value could not be captured back by [`Pattern::matches`]:
    /// a `*` or `:name` value that is empty or contains the capture delimiter.
    pub fn generate(&self, values: &Captures) -> Result<String, PatternError> {
        let delimiter = match &self.kind {
            Kind::Any => return self.fill(values),
            Kind::Segments(segments) => segments.separator() as char,
        };

        for part in &self.parts {
            let (capture, value) = match part {
                Part::Named(name) => (name.clone(), values.get(name)),
                Part::Star {
                    index,
                    globstar: false,
                } => (format!("*{index}"), values.star(*index)),
                _ => continue,
            };
            if let Some(value) = value {
                if value.is_empty() || value.contains(delimiter) {
                    return Err(PatternError::UnmatchableValue {
                        capture,
                        value: value.to_string(),
                        delimiter,
                    });
                }
            }
        }
        self.fill(values)
    }

    /// Substitute values without checking that they would match back. Used
    /// for text templates.
    pub fn fill(&self, values: &Captures) -> Result<String, PatternError> {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Static(text) => out.push_str(text),
                Part::Named(name) => out.push_str(
                    values
                        .get(name)
                        .ok_or_else(|| PatternError::MissingNamed(name.clone()))?,
                ),
                Part::Star { index, .. } => out.push_str(
                    values
                        .star(*index)
                        .ok_or(PatternError::MissingStar(*index))?,
                ),
            }
        }
        Ok(out)
    }

    /// Placeholder rendering for documentation: names render as themselves,
    /// stars as their ordinal.
    pub fn generate_example(&self) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                Part::Static(text) => text.clone(),
                Part::Named(name) => name.clone(),
                Part::Star { index, .. } => index.to_string(),
            })
            .collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn push_literal(parts: &mut Vec<Part>, tokens: &mut Vec<(Token, usize)>, text: &str, offset: usize) {
    tokens.extend(text.bytes().enumerate().map(|(k, b)| (Token::Literal(b), offset + k)));
    match parts.last_mut() {
        Some(Part::Static(existing)) => existing.push_str(text),
        _ => parts.push(Part::Static(text.to_string())),
    }
}

fn utf8_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
