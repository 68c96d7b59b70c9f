//! Notebook entry kinds and the page signature check.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Extension of wiki page files in the source notebook.
pub const PAGE_EXTENSION: &str = "txt";

/// Extension of translated pages in the vault.
pub const MARKDOWN_EXTENSION: &str = "md";

/// First signature line of every wiki page.
const CONTENT_TYPE_LINE: &str = "Content-Type: text/x-zim-wiki";

/// Prefix of the second signature line, followed by a single minor digit.
const WIKI_FORMAT_PREFIX: &str = "Wiki-Format: zim 0.";

/// Accepted minor versions of the wiki format.
const ACCEPTED_MINORS: std::ops::RangeInclusive<char> = '0'..='6';

/// Classification of a notebook file, decides where it goes in the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Wiki page - translated to markdown
    Page,
    /// Any other file - copied
    Attachment,
    /// Excluded by policy
    Ignored,
}

/// Check the two signature lines of a page (surrounding whitespace ignored).
pub fn is_page_signature(first: &str, second: &str) -> bool {
    if first.trim() != CONTENT_TYPE_LINE {
        return false;
    }

    let mut minor = match second.trim().strip_prefix(WIKI_FORMAT_PREFIX) {
        Some(rest) => rest.chars(),
        None => return false,
    };
    matches!((minor.next(), minor.next()), (Some(c), None) if ACCEPTED_MINORS.contains(&c))
}

/// Check whether `text` starts with the page signature.
pub fn text_has_page_signature(text: &str) -> bool {
    let mut lines = text.lines();
    match (lines.next(), lines.next()) {
        (Some(first), Some(second)) => is_page_signature(first, second),
        _ => false,
    }
}

/// Read the first two lines of a file and check the page signature.
///
/// Unreadable or non-UTF-8 files are simply not pages.
pub fn file_has_page_signature(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };

    let mut lines = BufReader::new(file).lines();
    match (lines.next(), lines.next()) {
        (Some(Ok(first)), Some(Ok(second))) => is_page_signature(&first, &second),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_accepted_versions() {
        for minor in 0..=6 {
            assert!(is_page_signature(
                "Content-Type: text/x-zim-wiki",
                &format!("Wiki-Format: zim 0.{minor}")
            ));
        }
    }

    #[test]
    fn test_rejected_versions() {
        let first = "Content-Type: text/x-zim-wiki";
        assert!(!is_page_signature(first, "Wiki-Format: zim 0.7"));
        assert!(!is_page_signature(first, "Wiki-Format: zim 0.42"));
        assert!(!is_page_signature(first, "Wiki-Format: zim 1.0"));
        assert!(!is_page_signature(first, "Wiki-Format: zim 0."));
        assert!(!is_page_signature("Content-Type: text/plain", "Wiki-Format: zim 0.4"));
    }

    #[test]
    fn test_signature_ignores_surrounding_whitespace() {
        assert!(is_page_signature(
            "Content-Type: text/x-zim-wiki\r",
            "  Wiki-Format: zim 0.4 "
        ));
    }

    #[test]
    fn test_text_signature() {
        assert!(text_has_page_signature(
            "Content-Type: text/x-zim-wiki\nWiki-Format: zim 0.6\n"
        ));
        assert!(!text_has_page_signature("Content-Type: text/x-zim-wiki"));
        assert!(!text_has_page_signature(""));
    }

    #[test]
    fn test_file_signature() {
        let dir = TempDir::new().unwrap();
        let page = dir.path().join("page.txt");
        let plain = dir.path().join("plain.txt");
        let binary = dir.path().join("blob.txt");

        fs::write(
            &page,
            "Content-Type: text/x-zim-wiki\nWiki-Format: zim 0.4\nCreation-Date: 2020-01-01\n\nbody",
        )
        .unwrap();
        fs::write(&plain, "just some notes\nwith lines\n").unwrap();
        fs::write(&binary, [0xff, 0xfe, 0x00, 0x10]).unwrap();

        assert!(file_has_page_signature(&page));
        assert!(!file_has_page_signature(&plain));
        assert!(!file_has_page_signature(&binary));
        assert!(!file_has_page_signature(&dir.path().join("missing.txt")));
    }
}
