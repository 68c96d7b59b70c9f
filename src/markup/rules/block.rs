//! Whole-line constructs: headings, checklist items, horizontal rules.

use std::sync::LazyLock;

use regex::Regex;
use smallvec::smallvec;

use super::{LineRule, Lines, keep};
use crate::core::ErrorKind;
use crate::markup::PageContext;

/// `===== Title =====`; the closing run is optional.
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(={1,6})\s+([^=\s].*?)\s*=*\s*$").unwrap());

/// Leading checkbox: `[ ]`, `[*]`, `[x]` or `[>]`.
static CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)(\[[ *x>]\])(\s|$)").unwrap());

/// Minimum run of dashes forming a horizontal rule.
const RULE_DASHES: usize = 20;

/// `={n}` -> `#` x (7 - n).
pub struct Heading;

impl LineRule for Heading {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn apply(&self, line: String, _: &PageContext<'_>) -> Result<Lines, ErrorKind> {
        let Some(caps) = HEADING.captures(&line) else {
            return keep(line);
        };
        let level = 7 - caps[1].len();
        Ok(smallvec![format!("{} {}", "#".repeat(level), &caps[2])])
    }
}

/// Checkbox items become task list items.
pub struct Checklist;

impl LineRule for Checklist {
    fn name(&self) -> &'static str {
        "checklist"
    }

    fn apply(&self, line: String, _: &PageContext<'_>) -> Result<Lines, ErrorKind> {
        if !CHECKBOX.is_match(&line) {
            return keep(line);
        }
        Ok(smallvec![CHECKBOX.replace(&line, "$1- $2$3").into_owned()])
    }
}

/// A line of at least twenty dashes.
pub struct HorizontalRule;

impl LineRule for HorizontalRule {
    fn name(&self) -> &'static str {
        "rule"
    }

    fn apply(&self, line: String, _: &PageContext<'_>) -> Result<Lines, ErrorKind> {
        let trimmed = line.trim();
        if trimmed.len() >= RULE_DASHES && trimmed.bytes().all(|b| b == b'-') {
            Ok(smallvec![String::new(), "---".to_string()])
        } else {
            keep(line)
        }
    }
}
