//! File name helpers.

use std::path::Path;

/// Split a file name into stem and final extension (dot included).
///
/// Leading dots never start an extension, so `.hidden` has none.
///
/// # Examples
///
/// - `"img.png"` -> `("img", ".png")`
/// - `"archive.tar.gz"` -> `("archive.tar", ".gz")`
/// - `"README"` -> `("README", "")`
/// - `".hidden"` -> `(".hidden", "")`
pub fn split_ext(name: &str) -> (&str, &str) {
    let body_start = name.len() - name.trim_start_matches('.').len();
    match name[body_start..].rfind('.') {
        Some(pos) => name.split_at(body_start + pos),
        None => (name, ""),
    }
}

/// Check a path's extension against `ext` (no dot), ignoring ASCII case.
#[inline]
pub fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
