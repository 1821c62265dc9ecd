//! Segment matching engine.
//!
//! # Responsibilities
//! - Align an input string against a compiled token list
//! - Resolve `*` and `**` by backtracking over candidate lengths
//! - Report the longest partial alignment when nothing matches
//!
//! # Design Decisions
//! - Explicit choice-point stack instead of recursion (bounded call depth
//!   regardless of pattern or input)
//! - Candidates are tried shortest first; the first full match wins
//! - A `(token, offset)` state that was already entered is never explored
//!   again: the token index only grows along a path, so a second visit means
//!   the first one failed. Work stays bounded by tokens times input length
//! - `*` never crosses the separator and never matches empty input
//! - Bytes are compared directly; capture boundaries stay on char boundaries

use std::collections::HashSet;

/// One compiled pattern token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A single literal byte.
    Literal(u8),
    /// `*` or `:name`: one or more bytes, never crossing the separator.
    Star(Option<String>),
    /// `**`: any number of bytes, crossing separators.
    Globstar,
}

/// A capture produced by a successful alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: Option<String>,
    pub value: String,
}

/// Outcome of [`SegmentMatcher::align`].
///
/// On failure `pattern_index` and `input_index` describe the furthest
/// structural alignment that was reached (byte offsets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub matched: bool,
    pub pattern_index: usize,
    pub input_index: usize,
    pub groups: Vec<Group>,
}

impl Alignment {
    /// True when the whole input was structurally recognized, even if the
    /// pattern still expected more.
    pub fn consumed_all(&self, input: &str) -> bool {
        self.matched || self.input_index >= input.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Located {
    token: Token,
    offset: usize,
}

/// Compiled token list plus the separator stars stop at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentMatcher {
    tokens: Vec<Located>,
    source_len: usize,
    separator: u8,
}

/// Capture span recorded during the search. `token` names the capture; the
/// trailing-slash catch-all has none.
#[derive(Debug, Clone, Copy)]
struct Span {
    token: Option<usize>,
    start: usize,
    end: usize,
}

struct Choice {
    token: usize,
    start: usize,
    candidates: Vec<(usize, usize)>,
    next: usize,
    groups: usize,
}

enum Step {
    Advance,
    Accept(Option<Span>),
    Branch(Vec<(usize, usize)>),
    Reject,
}

impl SegmentMatcher {
    /// Build a matcher from `(token, source offset)` pairs.
    pub fn new(tokens: Vec<(Token, usize)>, source_len: usize, separator: u8) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(|(token, offset)| Located { token, offset })
                .collect(),
            source_len,
            separator,
        }
    }

    pub fn separator(&self) -> u8 {
        self.separator
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().map(|l| &l.token)
    }

    /// Align `input` against the tokens.
    pub fn align(&self, input: &str) -> Alignment {
        let bytes = input.as_bytes();
        let mut choices: Vec<Choice> = Vec::new();
        let mut spans: Vec<Span> = Vec::new();
        let mut entered: HashSet<(usize, usize)> = HashSet::new();
        // (input consumed, token reached) of the furthest rejection
        let mut best = (0usize, 0usize);
        let (mut t, mut i) = (0usize, 0usize);

        loop {
            match self.step(input, t, i) {
                Step::Advance => {
                    t += 1;
                    i += 1;
                    continue;
                }
                Step::Accept(tail) => {
                    spans.extend(tail);
                    return Alignment {
                        matched: true,
                        pattern_index: self.source_len,
                        input_index: bytes.len(),
                        groups: self.groups(input, &spans),
                    };
                }
                Step::Branch(candidates) if !candidates.is_empty() => {
                    choices.push(Choice {
                        token: t,
                        start: i,
                        candidates,
                        next: 0,
                        groups: spans.len(),
                    });
                }
                Step::Branch(_) | Step::Reject => {
                    best = best.max((i, t));
                }
            }

            match Self::resume(&mut choices, &mut spans, &mut entered) {
                Some((next_t, next_i)) => {
                    t = next_t;
                    i = next_i;
                }
                None => {
                    return Alignment {
                        matched: false,
                        pattern_index: self.offset_of(best.1),
                        input_index: best.0,
                        groups: Vec::new(),
                    };
                }
            }
        }
    }

    fn step(&self, input: &str, t: usize, i: usize) -> Step {
        let bytes = input.as_bytes();
        let n = bytes.len();
        let last = t + 1 == self.tokens.len();

        let Some(located) = self.tokens.get(t) else {
            return if i == n || bytes[i] == b'?' {
                Step::Accept(None)
            } else {
                Step::Reject
            };
        };

        match &located.token {
            Token::Literal(b'/') if last => {
                if i < n && bytes[i] == b'/' {
                    Step::Accept(Some(Span { token: None, start: i + 1, end: n }))
                } else {
                    Step::Reject
                }
            }
            Token::Globstar if last => Step::Accept(Some(Span { token: Some(t), start: i, end: n })),
            Token::Globstar => {
                let followed_by_slash = self.tokens[t + 1].token == Token::Literal(b'/');
                let candidates = if followed_by_slash {
                    // zero-length skip first, then each later '/'
                    std::iter::once((t + 2, i))
                        .chain(
                            (i + 1..n)
                                .filter(|&j| bytes[j] == b'/')
                                .map(|j| (t + 1, j)),
                        )
                        .collect()
                } else {
                    (i..=n)
                        .filter(|&k| input.is_char_boundary(k))
                        .map(|k| (t + 1, k))
                        .collect()
                };
                Step::Branch(candidates)
            }
            Token::Star(_) => {
                let limit = bytes[i..]
                    .iter()
                    .position(|&b| b == self.separator)
                    .map_or(n, |p| i + p);
                Step::Branch(
                    (i + 1..=limit)
                        .filter(|&k| input.is_char_boundary(k))
                        .map(|k| (t + 1, k))
                        .collect(),
                )
            }
            Token::Literal(c) => {
                if i < n && bytes[i] == *c {
                    Step::Advance
                } else {
                    Step::Reject
                }
            }
        }
    }

    /// Pop exhausted choice points and take the next candidate of the
    /// innermost live one. Candidates leading to an already entered state
    /// are skipped.
    fn resume(
        choices: &mut Vec<Choice>,
        spans: &mut Vec<Span>,
        entered: &mut HashSet<(usize, usize)>,
    ) -> Option<(usize, usize)> {
        while let Some(choice) = choices.last_mut() {
            while let Some(&(next_t, next_i)) = choice.candidates.get(choice.next) {
                choice.next += 1;
                if !entered.insert((next_t, next_i)) {
                    continue;
                }
                spans.truncate(choice.groups);
                spans.push(Span {
                    token: Some(choice.token),
                    start: choice.start,
                    end: next_i,
                });
                return Some((next_t, next_i));
            }
            choices.pop();
        }
        None
    }

    fn groups(&self, input: &str, spans: &[Span]) -> Vec<Group> {
        spans
            .iter()
            .map(|span| Group {
                name: span.token.and_then(|t| match &self.tokens[t].token {
                    Token::Star(name) => name.clone(),
                    _ => None,
                }),
                value: input[span.start..span.end].to_string(),
            })
            .collect()
    }

    fn offset_of(&self, token: usize) -> usize {
        self.tokens
            .get(token)
            .map_or(self.source_len, |l| l.offset)
    }
}
