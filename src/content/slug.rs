//! Heading slug normalisation

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^A-Za-z0-9_\s-]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Map arbitrary text to a URL-safe anchor identifier.
///
/// Lowercases the input, drops everything that is not an ASCII word
/// character, whitespace or `-`, then turns each whitespace run into a
/// single `-`. Applying it twice gives the same result as applying it once.
///
/// ```
/// use inkpress::content::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("hello-world"), "hello-world");
/// ```
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lower, "");
    WHITESPACE.replace_all(&stripped, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("What's new in 2.0?"), "whats-new-in-20");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn test_empty() {
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(slugify("a \t  b\n c"), "a-b-c");
        assert_eq!(slugify("a - b"), "a---b");
    }

    #[test]
    fn test_non_ascii_is_dropped() {
        assert_eq!(slugify("Café crème"), "caf-crme");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_output_alphabet() {
        let inputs = [
            "Hello, World!",
            "  Leading and trailing  ",
            "Ünïcödé & <html> `code`",
            "tabs\tand\nnewlines",
            "MiXeD CaSe 123",
            "emoji 🚀 rocket",
        ];
        for input in inputs {
            let slug = slugify(input);
            assert!(
                slug.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'),
                "unexpected character in {slug:?}"
            );
        }
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Hello, World!",
            "  spaced   out  ",
            "İstanbul",
            "already-a-slug",
            "Ω and ß",
            "",
        ];
        for input in inputs {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "not idempotent for {input:?}");
        }
    }
}
