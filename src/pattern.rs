//! Filename pattern extraction.
//!
//! Derives a normalized "pattern key" from a filename so that sequentially
//! numbered or date-stamped files collapse to the same template, e.g.
//! `IMG_0001.jpg` and `IMG_0002.jpg` both yield the key `"img"`.
//!
//! The stripping rules are visible behavior of the crate, applied in order:
//! 1. the extension is removed,
//! 2. the name is case-folded to lowercase,
//! 3. date-like tokens are removed (`2024-01-31`, `31_01_2024`, `20240131`),
//! 4. remaining numeric runs are removed,
//! 5. separator runs (`_ - . ( ) [ ]` and whitespace) collapse to a single
//!    space and the result is trimmed.

use regex::Regex;
use std::sync::LazyLock;

/// Matches date-like tokens: `YYYY-MM-DD`, `DD-MM-YYYY` (also with `_` or `.`
/// separators) and bare 8-digit stamps.
static RE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}[-_.]\d{2}[-_.]\d{2})|(\d{2}[-_.]\d{2}[-_.]\d{4})|(\d{8})")
        .expect("Invalid date regex")
});

/// Matches runs of digits.
static RE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("Invalid digit regex"));

/// Matches runs of separator characters.
static RE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.()\[\]\s]+").expect("Invalid separator regex"));

/// Returns the filename without its extension.
///
/// Only the last dot counts, and a leading dot is not an extension marker,
/// so `archive.tar.gz` becomes `archive.tar` and `.gitignore` is unchanged.
pub fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Extracts the normalized pattern key from a filename.
///
/// # Examples
///
/// ```
/// use simsort::pattern::extract_key;
///
/// assert_eq!(extract_key("IMG_0001.jpg"), extract_key("IMG_0002.jpg"));
/// assert_eq!(extract_key("IMG_0001.jpg"), "img");
/// assert_eq!(extract_key("scan 2024-01-31 invoice.pdf"), "scan invoice");
/// ```
pub fn extract_key(name: &str) -> String {
    let stem = strip_extension(name).to_lowercase();
    let without_dates = RE_DATE.replace_all(&stem, " ");
    let without_digits = RE_DIGITS.replace_all(&without_dates, " ");
    RE_SEPARATORS
        .replace_all(&without_digits, " ")
        .trim()
        .to_string()
}

/// Counts the informative (alphanumeric) characters of a pattern key.
///
/// Used by the grouping engine to decide whether a key carries enough signal
/// to bucket files on.
pub fn informative_length(key: &str) -> usize {
    key.chars().filter(|c| c.is_alphanumeric()).count()
}
