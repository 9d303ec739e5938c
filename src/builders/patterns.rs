//! The `key <sep> value` line grammar shared by the scanner and the
//! properties editor.
//!
//! `#` and `;` lines are comments and never classify as pairs, even when
//! the text after the marker looks like `key=value`.

use regex::Regex;
use std::sync::LazyLock;

/// Matches a `key <sep> value` line. The key is built from `[A-Za-z0-9_.-]`,
/// the separator is `:` or `=`, and the value is everything after it with
/// surrounding whitespace removed.
static KV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9_.\-]+)\s*[:=]\s*(.+?)\s*$").expect("key/value regex is valid")
});

/// The result of classifying a single line of text.
///
/// `matched` is `false` for comments, blank lines and anything that does not
/// fit the `key <sep> value` shape. In that case `key` and `value` are empty
/// and the line must not be reported or altered by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedKv {
    /// The captured key, e.g. `database.port`.
    pub key: String,
    /// The captured value with surrounding whitespace trimmed. Quotes are kept.
    pub value: String,
    /// Whether the line parsed as a key/value pair.
    pub matched: bool,
}

impl ParsedKv {
    /// A classification for a line that is not a key/value pair.
    pub fn unmatched() -> Self {
        Self::default()
    }

    /// Returns the `(key, value)` pair when the line matched.
    pub fn as_pair(&self) -> Option<(&str, &str)> {
        self.matched
            .then_some((self.key.as_str(), self.value.as_str()))
    }
}

/// Returns `true` when the line is blank or a `#` / `;` comment once
/// surrounding whitespace is trimmed.
pub fn is_comment_or_blank(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';')
}

/// Classifies one line of configuration text.
///
/// Comment and blank lines are rejected before any key/value matching, so
/// `#key=value` is never treated as a pair.
///
/// # Arguments
/// * `line`: A single physical line without its terminator.
///
/// # Returns
/// A `ParsedKv` with `matched = true` and the captured key and trimmed value
/// when the line has the `key <sep> value` shape.
pub fn classify(line: &str) -> ParsedKv {
    if is_comment_or_blank(line) {
        return ParsedKv::unmatched();
    }

    match KV_RE.captures(line) {
        Some(caps) => ParsedKv {
            key: caps[1].to_string(),
            value: caps[2].trim().to_string(),
            matched: true,
        },
        None => ParsedKv::unmatched(),
    }
}

/// Removes exactly one layer of matching single or double quotes.
///
/// The input is trimmed first; the content between the quotes is returned
/// untouched, inner whitespace included. Unbalanced quotes are left as-is.
pub fn strip_quotes(value: &str) -> &str {
    let trimmed = value.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' && last == b'\'') || (first == b'"' && last == b'"') {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_simple_pair() {
        let parsed = classify("key=value");
        assert_eq!(
            parsed,
            ParsedKv {
                key: "key".to_string(),
                value: "value".to_string(),
                matched: true
            }
        );
    }

    #[test]
    fn test_classify_trims_spacing_around_key_and_value() {
        let parsed = classify("  spaced_key  =  spaced value  ");
        assert!(parsed.matched);
        assert_eq!(parsed.key, "spaced_key");
        assert_eq!(parsed.value, "spaced value");
    }

    #[test]
    fn test_classify_colon_separator_and_key_charset() {
        for line in [
            "port: 8080",
            "host.name = localhost",
            "key_with_underscores=value",
            "key-with-dashes=value",
            "key.with.dots=value",
        ] {
            assert!(classify(line).matched, "expected {line:?} to match");
        }
        assert_eq!(classify("port: 8080").as_pair(), Some(("port", "8080")));
    }

    #[test]
    fn test_classify_rejects_comments_even_when_pair_shaped() {
        for line in ["#key=value", "  # comment = not a kv", "; ini=comment", "", "   \t"] {
            assert!(is_comment_or_blank(line));
            assert!(!classify(line).matched, "expected {line:?} to be rejected");
        }
    }

    #[test]
    fn test_classify_rejects_free_form_text() {
        assert!(!classify("invalid line").matched);
        assert!(!classify("connect to 192.168.1.1:8080").matched);
        assert_eq!(classify("invalid line").as_pair(), None);
    }

    #[test]
    fn test_classify_keeps_quotes_in_value() {
        let parsed = classify("host = \"10.0.0.1\"");
        assert_eq!(parsed.value, "\"10.0.0.1\"");
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"quoted\""), "quoted");
        assert_eq!(strip_quotes("'single'"), "single");
        assert_eq!(strip_quotes("unquoted"), "unquoted");
        assert_eq!(strip_quotes("\"partial"), "\"partial");
        assert_eq!(strip_quotes("mixed'"), "mixed'");
        assert_eq!(strip_quotes("  \"  spaced  \"  "), "  spaced  ");
        assert_eq!(strip_quotes("\"'nested'\""), "'nested'");
        assert_eq!(strip_quotes(""), "");
    }
}
