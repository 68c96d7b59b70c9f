//! Link target classification utilities.

/// Shorthand prefix for encyclopedia links (`[[wp?Rust]]`).
pub const WIKIPEDIA_PREFIX: &str = "wp?";

/// Base URL the encyclopedia shorthand expands to.
pub const WIKIPEDIA_BASE: &str = "https://wikipedia.org/wiki/";

/// Syntactic classification of a link or embed target.
///
/// Classification only looks at prefixes; resolving a target against the
/// vault map happens in [`crate::address::LinkResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind<'a> {
    /// `wp?Page` - value is the article name.
    Wikipedia(&'a str),
    /// `http://`, `https://` or `mailto:` URL.
    Web(&'a str),
    /// `file://` URI, value is the full URI.
    FileUri(&'a str),
    /// `~` or `~/path` home shorthand, value is the full target.
    Home(&'a str),
    /// `./name` or `.\name` - value is the name without the marker.
    Relative(&'a str),
    /// `+Child` - value is the child reference without `+`.
    SubPage(&'a str),
    /// `:Root:Page` - value is the reference without the leading `:`.
    Absolute(&'a str),
    /// `Parent:Child` bare namespace reference.
    Namespace(&'a str),
}

impl<'a> TargetKind<'a> {
    /// Parse a target string into its syntactic kind.
    pub fn parse(target: &'a str) -> Self {
        if let Some(article) = target.strip_prefix(WIKIPEDIA_PREFIX) {
            Self::Wikipedia(article)
        } else if Self::is_web(target) {
            Self::Web(target)
        } else if target.starts_with("file://") {
            Self::FileUri(target)
        } else if target == "~" || target.starts_with("~/") {
            Self::Home(target)
        } else if let Some(rest) = target
            .strip_prefix("./")
            .or_else(|| target.strip_prefix(".\\"))
        {
            Self::Relative(rest)
        } else if let Some(rest) = target.strip_prefix('+') {
            Self::SubPage(rest)
        } else if let Some(rest) = target.strip_prefix(':') {
            Self::Absolute(rest)
        } else {
            Self::Namespace(target)
        }
    }

    /// Check if target is a web URL.
    #[inline]
    pub fn is_web(target: &str) -> bool {
        target.starts_with("http://") || target.starts_with("https://") || target.starts_with("mailto:")
    }

    /// Check if target refers to something outside the vault.
    pub const fn is_absolute_file(&self) -> bool {
        matches!(self, Self::FileUri(_) | Self::Home(_))
    }
}

/// Strip a relative `./` or `.\` marker from a label.
#[inline]
pub fn strip_relative_marker(label: &str) -> &str {
    label
        .strip_prefix("./")
        .or_else(|| label.strip_prefix(".\\"))
        .unwrap_or(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wikipedia() {
        assert_eq!(
            TargetKind::parse("wp?Rust (programming language)"),
            TargetKind::Wikipedia("Rust (programming language)")
        );
    }

    #[test]
    fn test_parse_web() {
        assert_eq!(
            TargetKind::parse("https://zim-wiki.org"),
            TargetKind::Web("https://zim-wiki.org")
        );
        assert_eq!(
            TargetKind::parse("http://example.com/a//b"),
            TargetKind::Web("http://example.com/a//b")
        );
        assert_eq!(
            TargetKind::parse("mailto:someone@example.com"),
            TargetKind::Web("mailto:someone@example.com")
        );
        // A namespace that merely starts with "http" is not a URL
        assert_eq!(
            TargetKind::parse("httpd:Config"),
            TargetKind::Namespace("httpd:Config")
        );
    }

    #[test]
    fn test_parse_absolute_files() {
        assert_eq!(
            TargetKind::parse("file:///home/me/report.pdf"),
            TargetKind::FileUri("file:///home/me/report.pdf")
        );
        assert_eq!(TargetKind::parse("~/scan.png"), TargetKind::Home("~/scan.png"));
        assert!(TargetKind::parse("~").is_absolute_file());
        assert!(!TargetKind::parse("~tilde page").is_absolute_file());
    }

    #[test]
    fn test_parse_relative() {
        assert_eq!(TargetKind::parse("./img.png"), TargetKind::Relative("img.png"));
        assert_eq!(TargetKind::parse(".\\img.png"), TargetKind::Relative("img.png"));
        assert_eq!(
            TargetKind::parse("./sub/doc.pdf"),
            TargetKind::Relative("sub/doc.pdf")
        );
    }

    #[test]
    fn test_parse_namespaces() {
        assert_eq!(TargetKind::parse("+Sub"), TargetKind::SubPage("Sub"));
        assert_eq!(
            TargetKind::parse(":Home:Page"),
            TargetKind::Absolute("Home:Page")
        );
        assert_eq!(
            TargetKind::parse("Parent:Child"),
            TargetKind::Namespace("Parent:Child")
        );
    }

    #[test]
    fn test_strip_relative_marker() {
        assert_eq!(strip_relative_marker("./img.png"), "img.png");
        assert_eq!(strip_relative_marker(".\\img.png"), "img.png");
        assert_eq!(strip_relative_marker("Image"), "Image");
    }
}
