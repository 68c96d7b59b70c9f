//! Splits a line into plain text and `[[...]]` / `{{...}}` tokens.

use crate::core::{EmbedToken, LinkToken};

/// One piece of a scanned line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Link(LinkToken<'a>),
    Embed(EmbedToken<'a>),
}

#[derive(Debug, Clone, Copy)]
enum Open {
    Link,
    Embed,
}

impl Open {
    const fn close(self) -> &'static str {
        match self {
            Self::Link => "]]",
            Self::Embed => "}}",
        }
    }
}

/// Scan `line` left to right.
///
/// - `[[a [[b]]` takes the innermost opening: `[[b]]`.
/// - `{{{` is never an embed (code fence syntax).
/// - `![[...]]` is already vault markup and stays text.
/// - Empty tokens and unclosed openings stay text.
pub fn scan(line: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some((start, open)) = find_open(line, pos) {
        let inner_start = start + 2;
        let Some(len) = line[inner_start..].find(open.close()) else {
            break;
        };
        let end = inner_start + len + 2;
        let inner = &line[inner_start..inner_start + len];

        match open {
            Open::Embed if line[start..].starts_with("{{{") => {
                pos = start + line[start..].len() - line[start..].trim_start_matches('{').len();
                continue;
            }
            Open::Link if line[..start].ends_with('!') => {
                pos = end;
                continue;
            }
            Open::Link => {
                if let Some(nested) = inner.rfind("[[") {
                    pos = inner_start + nested;
                    continue;
                }
            }
            Open::Embed => {
                if let Some(nested) = inner.rfind("{{") {
                    pos = inner_start + nested;
                    continue;
                }
            }
        }

        if inner.is_empty() {
            pos = end;
            continue;
        }

        if text_start < start {
            segments.push(Segment::Text(&line[text_start..start]));
        }
        let raw = &line[start..end];
        segments.push(match open {
            Open::Link => Segment::Link(LinkToken::new(raw, inner)),
            Open::Embed => Segment::Embed(EmbedToken::new(raw, inner)),
        });
        text_start = end;
        pos = end;
    }

    if text_start < line.len() {
        segments.push(Segment::Text(&line[text_start..]));
    }
    segments
}

/// Earliest `[[` or `{{` at or after `from`.
fn find_open(line: &str, from: usize) -> Option<(usize, Open)> {
    let rest = &line[from..];
    let link = rest.find("[[").map(|i| (from + i, Open::Link));
    let embed = rest.find("{{").map(|i| (from + i, Open::Embed));
    match (link, embed) {
        (Some(l), Some(e)) => Some(if l.0 <= e.0 { l } else { e }),
        (l, e) => l.or(e),
    }
}
