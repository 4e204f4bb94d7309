// src/common/slug.rs

use std::sync::LazyLock;

use regex::Regex;

pub static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("regex de slug válida"));

pub static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("regex de cor válida"));

static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("regex válida"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("regex válida"));

/// "Çeper Haly #1" -> "eper-haly-1"
pub fn slugify(input: &str) -> String {
    let lower = input.to_lowercase();
    NON_ALNUM_RE
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// "Dark Grey" -> "dark-grey"
pub fn normalize_color(input: &str) -> String {
    WHITESPACE_RE
        .replace_all(input.trim(), "-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_and_trims_separators() {
        assert_eq!(slugify("AH-1024"), "ah-1024");
        assert_eq!(slugify("  Ceper  Haly!! "), "ceper-haly");
        assert_eq!(slugify("--x__y--"), "x-y");
    }

    #[test]
    fn normalize_color_lowercases_and_dashes() {
        assert_eq!(normalize_color("Dark Grey"), "dark-grey");
        assert_eq!(normalize_color("Cream"), "cream");
    }

    #[test]
    fn slug_regex_rejects_uppercase_and_spaces() {
        assert!(SLUG_RE.is_match("home-2"));
        assert!(!SLUG_RE.is_match("Home"));
        assert!(!SLUG_RE.is_match("a b"));
    }
}
