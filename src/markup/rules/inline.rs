//! Inline markup: tags and emphasis.
//!
//! Both rules only touch text between protected spans, so URLs and the
//! targets of already rendered links keep their `//` and `__`. Labels of
//! rendered `[label](target)` links are ordinary text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use smallvec::smallvec;

use super::{LineRule, Lines};
use crate::core::ErrorKind;
use crate::markup::PageContext;

/// Spans no inline rule may rewrite.
static PROTECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"`[^`]*`",
        r"|!?\[\[[^\]]*\]\]",
        r"|\]\((?:<[^>]*>|[^)\s]*)\)",
        r"|[A-Za-z][A-Za-z0-9+.-]*://\S+",
        r"|mailto:\S+",
    ))
    .unwrap()
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|\s)@(\w[\w-]*)").unwrap());

/// Wiki emphasis and its markdown replacement, applied in order.
static EMPHASIS: LazyLock<[(Regex, &'static str); 4]> = LazyLock::new(|| {
    [
        (Regex::new(r"//(.+?)//").unwrap(), "*$1*"),
        (Regex::new(r"__(.+?)__").unwrap(), "==$1=="),
        (Regex::new(r"_\{(.+?)\}").unwrap(), "<sub>$1</sub>"),
        (Regex::new(r"\^\{(.+?)\}").unwrap(), "<sup>$1</sup>"),
    ]
});

/// `@tag` -> `#tag` at line start or after whitespace.
pub struct Tags;

impl LineRule for Tags {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn apply(&self, line: String, _: &PageContext<'_>) -> Result<Lines, ErrorKind> {
        Ok(smallvec![outside_protected(&line, |text| {
            TAG.replace_all(text, "$1#$2")
        })])
    }
}

/// Italic, highlight, subscript and superscript.
///
/// `**bold**` and `~~strike~~` are already markdown.
pub struct Emphasis;

impl LineRule for Emphasis {
    fn name(&self) -> &'static str {
        "emphasis"
    }

    fn apply(&self, line: String, _: &PageContext<'_>) -> Result<Lines, ErrorKind> {
        Ok(smallvec![outside_protected(&line, |text| {
            if !EMPHASIS.iter().any(|(pattern, _)| pattern.is_match(text)) {
                return Cow::Borrowed(text);
            }
            let mut text = text.to_string();
            for (pattern, replacement) in EMPHASIS.iter() {
                text = pattern.replace_all(&text, *replacement).into_owned();
            }
            Cow::Owned(text)
        })])
    }
}

/// Apply `rewrite` to every stretch of `line` between protected spans.
fn outside_protected<'t, F>(line: &'t str, rewrite: F) -> String
where
    F: Fn(&'t str) -> Cow<'t, str>,
{
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for span in PROTECTED.find_iter(line) {
        out.push_str(&rewrite(&line[last..span.start()]));
        out.push_str(span.as_str());
        last = span.end();
    }
    out.push_str(&rewrite(&line[last..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::tests::Fixture;

    fn run(rule: &dyn LineRule, line: &str) -> String {
        let fixture = Fixture::new();
        let ctx = fixture.context("Home.txt");
        rule.apply(line.to_string(), &ctx).unwrap().remove(0)
    }

    #[test]
    fn test_tags() {
        assert_eq!(run(&Tags, "@idea for @work-2"), "#idea for #work-2");
        assert_eq!(run(&Tags, "mail me@example.com"), "mail me@example.com");
        assert_eq!(run(&Tags, "\t@nested"), "\t#nested");
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(run(&Emphasis, "//slanted// text"), "*slanted* text");
        assert_eq!(run(&Emphasis, "__marked__"), "==marked==");
        assert_eq!(run(&Emphasis, "H_{2}O and x^{2}"), "H<sub>2</sub>O and x<sup>2</sup>");
        assert_eq!(run(&Emphasis, "**bold** ~~gone~~"), "**bold** ~~gone~~");
    }

    #[test]
    fn test_protected_spans() {
        assert_eq!(
            run(&Emphasis, "//see// https://example.com//path//"),
            "*see* https://example.com//path//"
        );
        assert_eq!(
            run(&Emphasis, "[init](<src/__init__ py>) `a__b__c` __x__"),
            "[init](<src/__init__ py>) `a__b__c` ==x=="
        );
        assert_eq!(
            run(&Emphasis, "![[attachments/__x__.png]]"),
            "![[attachments/__x__.png]]"
        );
        assert_eq!(run(&Tags, "`@decorator` @tag"), "`@decorator` #tag");
    }

    #[test]
    fn test_link_label_emphasis() {
        assert_eq!(
            run(&Emphasis, "see [//the// log](Work_Log) now"),
            "see [*the* log](Work_Log) now"
        );
        assert_eq!(
            run(&Emphasis, "[__big__ site](https://x.org/__a__)"),
            "[==big== site](https://x.org/__a__)"
        );
    }
}
