//! Code regions, copied without running any line rule.

use std::sync::LazyLock;

use regex::Regex;

/// `lang="..."` attribute of a wiki code block.
static LANG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"lang="([^"]*)""#).unwrap());

const WIKI_OPEN: &str = "{{{code:";
const WIKI_CLOSE: &str = "}}}";
const MARKDOWN_FENCE: &str = "```";

/// An open code region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fence {
    /// `{{{code: lang="..."` ... `}}}`
    Wiki,
    /// A markdown fence; `marker` is the run of backticks that opened it.
    Markdown { marker: String },
}

impl Fence {
    /// Recognize an opening line.
    ///
    /// Returns the fence and the line to emit in its place.
    pub fn open(line: &str) -> Option<(Self, String)> {
        if line.starts_with(WIKI_OPEN) {
            let lang = LANG
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| normalize_lang(m.as_str()))
                .unwrap_or_default();
            return Some((Self::Wiki, format!("{MARKDOWN_FENCE}{lang}")));
        }

        let trimmed = line.trim_start();
        let ticks = trimmed.len() - trimmed.trim_start_matches('`').len();
        (ticks >= MARKDOWN_FENCE.len()).then(|| {
            let marker = trimmed[..ticks].to_string();
            (Self::Markdown { marker }, line.to_string())
        })
    }

    /// Whether `line` ends this region.
    pub fn closes(&self, line: &str) -> bool {
        match self {
            Self::Wiki => line.starts_with(WIKI_CLOSE),
            Self::Markdown { marker } => line
                .trim_start()
                .strip_prefix(marker.as_str())
                .is_some_and(|rest| rest.trim_start_matches('`').trim().is_empty()),
        }
    }

    /// Line emitted for the closing line.
    pub fn closing(&self, line: &str) -> String {
        match self {
            Self::Wiki => MARKDOWN_FENCE.to_string(),
            Self::Markdown { .. } => line.to_string(),
        }
    }

    /// Closing line appended when the page ends inside the region.
    pub fn terminator(&self) -> String {
        match self {
            Self::Wiki => MARKDOWN_FENCE.to_string(),
            Self::Markdown { marker } => marker.clone(),
        }
    }
}

fn normalize_lang(lang: &str) -> &str {
    match lang {
        "python3" => "python",
        other => other,
    }
}
