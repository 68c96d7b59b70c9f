//! Link and embed tokens found inside a page line.

use super::TargetKind;

/// `[[target]]` or `[[target|label]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkToken<'a> {
    /// Full span including brackets, emitted unchanged when unresolved
    pub raw: &'a str,
    pub target: &'a str,
    /// Explicit label; `None` means the label is implied by the target
    pub label: Option<&'a str>,
}

impl<'a> LinkToken<'a> {
    /// Build from the full span and the text between the brackets.
    ///
    /// Splits at the first `|`. An empty label counts as no label.
    pub fn new(raw: &'a str, inner: &'a str) -> Self {
        let (target, label) = match inner.split_once('|') {
            Some((target, label)) => (target, Some(label).filter(|l| !l.is_empty())),
            None => (inner, None),
        };
        Self { raw, target, label }
    }
}

/// `{{target}}` or `{{target?key=value&...}}`.
///
/// Web URLs keep their query string and take no options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedToken<'a> {
    pub raw: &'a str,
    pub target: &'a str,
    /// Option string after the first `?`
    pub options: Option<&'a str>,
}

impl<'a> EmbedToken<'a> {
    pub fn new(raw: &'a str, inner: &'a str) -> Self {
        let (target, options) = match inner.split_once('?') {
            Some(_) if TargetKind::is_web(inner) => (inner, None),
            Some((target, options)) => (target, Some(options)),
            None => (inner, None),
        };
        Self {
            raw,
            target,
            options,
        }
    }

    /// Iterate `key=value` pairs of the option string.
    ///
    /// A pair without `=` yields an empty value.
    pub fn option_pairs(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.options
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
    }
}
