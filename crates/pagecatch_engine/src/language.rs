use std::sync::LazyLock;

use regex::Regex;

static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));
static WWW_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"www\.\S+").expect("valid www regex"));
static SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid symbol regex"));

/// Coarse check for English diff text.
///
/// URLs and symbols are removed first; the rest counts as English when strictly
/// more than half of its characters are ASCII letters.
pub fn is_english(text: &str) -> bool {
    let without_urls = HTTP_URL.replace_all(text, "");
    let without_urls = WWW_URL.replace_all(&without_urls, "");
    let remaining = SYMBOLS.replace_all(&without_urls, "");
    if remaining.is_empty() {
        return false;
    }

    let total = remaining.chars().count();
    let ascii_alpha = remaining
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .count();
    ascii_alpha * 2 > total
}
