//! Wiki markup to vault markdown, one page at a time.
//!
//! # Page Flow
//!
//! ```text
//! page text
//!     |
//!     +-- strip header (signature + `Key: value` lines + blank line)
//!     +-- drop `====== Title ======` when it repeats the page title
//!     |
//!     +-- for each line
//!           +-- inside a code region?  -> verbatim (fence lines rewritten)
//!           +-- otherwise              -> rules::apply_rules
//!     |
//!     v
//! lines joined with `\n` + trailing newline
//! ```
//!
//! # Module Structure
//!
//! - [`token`]: `[[...]]` / `{{...}}` scanner
//! - [`fence`]: code regions
//! - [`rules`]: the ordered [`LineRule`](rules::LineRule) list

mod fence;
pub mod rules;
mod token;

use std::sync::LazyLock;

use regex::Regex;

use crate::address::{LinkResolver, PageScope};
use crate::core::{Diagnostics, MigrateError, Warning, text_has_page_signature};
use crate::utils::date::CalendarDate;

use fence::Fence;
pub use token::{Segment, scan};

/// `Key: value` line of the page header.
static HEADER_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*:\s").unwrap());

/// Top level heading repeating the page title.
static TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^====== (.*) ======\s*$").unwrap());

/// Everything a rule may need about the page being translated.
pub struct PageContext<'a> {
    pub scope: PageScope,
    pub resolver: LinkResolver<'a>,
    /// Year source for deadlines written without one
    pub today: CalendarDate,
    pub diagnostics: &'a Diagnostics,
}

/// Translate one page's text.
///
/// Warnings go to `ctx.diagnostics` tagged with their source line; the first
/// fatal problem aborts the page.
pub fn translate_page(text: &str, ctx: &PageContext<'_>) -> Result<String, MigrateError> {
    let lines: Vec<&str> = text.lines().collect();
    let start = body_start(text, &lines, &ctx.scope.title);

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut fence: Option<(Fence, usize)> = None;

    for (index, &line) in lines.iter().enumerate().skip(start) {
        let number = index + 1;
        ctx.diagnostics.set_line(number);

        if let Some((open, _)) = &fence {
            if open.closes(line) {
                out.push(open.closing(line));
                fence = None;
            } else {
                out.push(line.to_string());
            }
            continue;
        }

        if let Some((open, opening)) = Fence::open(line) {
            out.push(opening);
            fence = Some((open, number));
            continue;
        }

        let rewritten = rules::apply_rules(line.to_string(), ctx)
            .map_err(|kind| MigrateError::new(&ctx.scope.relative, Some(number), kind))?;
        out.extend(rewritten);
    }

    if let Some((open, opened)) = fence {
        ctx.diagnostics.set_line(opened);
        ctx.diagnostics.warn(Warning::UnterminatedFence);
        out.push(open.terminator());
    }

    let mut page = out.join("\n");
    page.push('\n');
    Ok(page)
}

/// Index of the first body line.
fn body_start(text: &str, lines: &[&str], title: &str) -> usize {
    let mut start = 0;

    if text_has_page_signature(text) {
        while lines.get(start).is_some_and(|l| HEADER_FIELD.is_match(l)) {
            start += 1;
        }
        if lines.get(start).is_some_and(|l| l.trim().is_empty()) {
            start += 1;
        }
    }

    let repeats_title = lines
        .get(start)
        .and_then(|l| TITLE_LINE.captures(l))
        .is_some_and(|caps| caps[1].replace('_', " ") == title);
    if repeats_title {
        start += 1;
    }
    start
}
