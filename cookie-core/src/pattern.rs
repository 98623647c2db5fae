//! Placeholder scanning and rendering.
//!
//! Header values may carry placeholders that are replaced with synced data
//! before the request leaves:
//!
//! | token            | grammar | meaning                                  |
//! |------------------|---------|------------------------------------------|
//! | `!{name}`        | cookie  | cookies of peer `name`, forced refresh   |
//! | `${name}`        | cookie  | cookies of peer `name`, cache allowed    |
//! | `!{peer}`        | header  | same-named header of `peer`, forced      |
//! | `!{peer\|key}`   | header  | header `key` of `peer`, forced           |
//! | `${peer}`        | header  | same-named header of `peer`, cached      |
//! | `${peer\|key}`   | header  | header `key` of `peer`, cached           |
//!
//! In the header grammar `peer` may be empty, which selects the default
//! peer. Text that does not complete a token is kept literally.
//!
//! [`scan`] makes a single left-to-right pass over the original value and
//! [`render`] writes a fresh output, so replacement text is never scanned
//! again.

use std::collections::HashMap;

/// Which placeholder grammar applies to a header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// The `Cookie` header: `!{name}` / `${name}`
    Cookie,
    /// Any other header: `!{peer}` / `!{peer|key}` and the `$` forms
    Header,
}

/// Whether a token may be answered from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// `!{..}` - always fetch from the store
    Forced,
    /// `${..}` - use cached data while it is fresh
    Cached,
}

impl FetchMode {
    /// Whether cached data may answer this token.
    pub fn use_cache(self) -> bool {
        matches!(self, FetchMode::Cached)
    }
}

/// One placeholder found in a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token<'a> {
    /// Forced or cached
    pub mode: FetchMode,
    /// Peer alias (cookie name in the cookie grammar); may be empty for headers
    pub peer: &'a str,
    /// Header key after `|`, header grammar only
    pub key: Option<&'a str>,
    /// The token exactly as written, e.g. `${a|X-Token}`
    pub raw: &'a str,
}

/// A piece of a scanned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied through unchanged
    Literal(&'a str),
    /// A placeholder to substitute
    Token(Token<'a>),
}

impl<'a> Segment<'a> {
    /// The token, if this segment is one.
    pub fn as_token(&self) -> Option<&Token<'a>> {
        match self {
            Segment::Token(token) => Some(token),
            Segment::Literal(_) => None,
        }
    }
}

/// Split `input` into literal and token segments.
///
/// Adjacent literal text is merged into one segment.
pub fn scan(input: &str, grammar: Grammar) -> Vec<Segment<'_>> {
    let bytes = input.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i + 1 < bytes.len() {
        let mode = match bytes[i] {
            b'!' => FetchMode::Forced,
            b'$' => FetchMode::Cached,
            _ => {
                i += 1;
                continue;
            }
        };
        if bytes[i + 1] != b'{' {
            i += 1;
            continue;
        }

        let body_start = i + 2;
        let Some(close) = input[body_start..].find('}').map(|p| body_start + p) else {
            // No closing brace anywhere after this point
            break;
        };

        match parse_body(&input[body_start..close], grammar) {
            Some((peer, key)) => {
                if literal_start < i {
                    segments.push(Segment::Literal(&input[literal_start..i]));
                }
                segments.push(Segment::Token(Token {
                    mode,
                    peer,
                    key,
                    raw: &input[i..=close],
                }));
                i = close + 1;
                literal_start = i;
            }
            None => i += 1,
        }
    }

    if literal_start < input.len() {
        segments.push(Segment::Literal(&input[literal_start..]));
    }
    segments
}

fn parse_body(body: &str, grammar: Grammar) -> Option<(&str, Option<&str>)> {
    match grammar {
        Grammar::Cookie => (!body.is_empty()).then_some((body, None)),
        Grammar::Header => match body.split_once('|') {
            Some((_, "")) => None,
            Some((peer, key)) => Some((peer, Some(key))),
            None => Some((body, None)),
        },
    }
}

/// Distinct tokens in order of first appearance.
pub fn distinct_tokens<'a>(segments: &[Segment<'a>]) -> Vec<Token<'a>> {
    let mut tokens: Vec<Token<'a>> = Vec::new();
    for token in segments.iter().filter_map(Segment::as_token) {
        if !tokens.contains(token) {
            tokens.push(*token);
        }
    }
    tokens
}

/// Build the output value: literals copied, tokens replaced from `values`.
///
/// A token with no entry in `values` is written back as its raw text.
pub fn render(segments: &[Segment<'_>], values: &HashMap<Token<'_>, String>) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Token(token) => match values.get(token) {
                Some(value) => out.push_str(value),
                None => out.push_str(token.raw),
            },
        }
    }
    out
}
