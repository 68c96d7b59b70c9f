//! Collision-free file names for the flattened attachment directory.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;

use crate::utils::path::split_ext;

/// Leftmost digit run immediately followed by a dot that starts the rest.
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)([0-9]+)(\..+)$").unwrap());

/// Pick the first name not in `existing`, starting from `requested`.
///
/// A colliding name has its numeric suffix incremented (`scan 1.png` ->
/// `scan 2.png`), or gets one inserted before the extension when it has
/// none (`scan.png` -> `scan 1.png`).
///
/// The *leftmost* digit run before a dot is the one incremented, so
/// `2024.01 scan.png` becomes `2025.01 scan.png`.
pub fn allocate(existing: &FxHashSet<String>, requested: &str) -> String {
    let mut candidate = requested.to_string();
    while existing.contains(&candidate) {
        candidate = next_candidate(&candidate);
    }
    candidate
}

fn next_candidate(name: &str) -> String {
    match NUMBERED.captures(name) {
        Some(caps) => format!("{}{}{}", &caps[1], increment(&caps[2]), &caps[3]),
        None => {
            let (stem, ext) = split_ext(name);
            format!("{stem} 1{ext}")
        }
    }
}

/// Add one to a decimal digit string of any length.
///
/// Leading zeros are not kept: `"007"` -> `"8"`.
fn increment(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    let mut out: Vec<u8> = trimmed.bytes().collect();

    let mut carry = true;
    for digit in out.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        out.insert(0, b'1');
    }

    // Only ASCII digits were touched
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> FxHashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_collision_is_unchanged() {
        let existing = names(&["other.png"]);
        assert_eq!(allocate(&existing, "pasted_image.png"), "pasted_image.png");
    }

    #[test]
    fn test_suffix_inserted_then_incremented() {
        let mut existing = FxHashSet::default();
        let mut assigned = Vec::new();
        for _ in 0..3 {
            let name = allocate(&existing, "pasted_image.png");
            existing.insert(name.clone());
            assigned.push(name);
        }
        assert_eq!(
            assigned,
            ["pasted_image.png", "pasted_image 1.png", "pasted_image 2.png"]
        );
    }

    #[test]
    fn test_leftmost_digit_run() {
        let existing = names(&["2024.01 scan.png"]);
        assert_eq!(allocate(&existing, "2024.01 scan.png"), "2025.01 scan.png");
    }

    #[test]
    fn test_leading_zeros_dropped() {
        let existing = names(&["img007.png"]);
        assert_eq!(allocate(&existing, "img007.png"), "img8.png");
    }

    #[test]
    fn test_no_extension_appends() {
        let existing = names(&["README"]);
        assert_eq!(allocate(&existing, "README"), "README 1");

        let existing = names(&[".hidden"]);
        assert_eq!(allocate(&existing, ".hidden"), ".hidden 1");
    }

    #[test]
    fn test_result_never_collides() {
        let existing = names(&["a.png", "a 1.png", "a 2.png", "a 3.png"]);
        let name = allocate(&existing, "a.png");
        assert!(!existing.contains(&name));
        assert_eq!(name, "a 4.png");
    }

    #[test]
    fn test_increment() {
        assert_eq!(increment("1"), "2");
        assert_eq!(increment("9"), "10");
        assert_eq!(increment("0099"), "100");
        assert_eq!(increment("000"), "1");
        assert_eq!(
            increment("99999999999999999999999999999999999999999"),
            "100000000000000000000000000000000000000000"
        );
    }
}
