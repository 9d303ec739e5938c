//! Heuristic detectors for IP addresses and network ports embedded in
//! arbitrary configuration text.
//!
//! These are deliberately loose: they match substrings, not whole values, and
//! the port check counts digits instead of enforcing the 1-65535 range.

use regex::Regex;
use std::sync::LazyLock;

use crate::builders::patterns::strip_quotes;

// Word boundaries are ASCII-only so a non-ASCII letter never glues onto an
// address or a port token.
static IPV4_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?-u:\b)((25[0-5]|2[0-4][0-9]|[01]?[0-9]?[0-9])\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9]?[0-9])(?-u:\b)",
    )
    .expect("IPv4 regex is valid")
});

// Full form, every single-`::` compression, then `::1` and `::` on their own.
static IPV6_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(?:",
        r"(?:[0-9a-f]{1,4}:){7}[0-9a-f]{1,4}",
        r"|(?:[0-9a-f]{1,4}:){1,6}::[0-9a-f]{1,4}",
        r"|(?:[0-9a-f]{1,4}:){1,5}(?::[0-9a-f]{1,4}){1,2}",
        r"|(?:[0-9a-f]{1,4}:){1,4}(?::[0-9a-f]{1,4}){1,3}",
        r"|(?:[0-9a-f]{1,4}:){1,3}(?::[0-9a-f]{1,4}){1,4}",
        r"|(?:[0-9a-f]{1,4}:){1,2}(?::[0-9a-f]{1,4}){1,5}",
        r"|[0-9a-f]{1,4}:(?::[0-9a-f]{1,4}){1,6}",
        r"|:(?::[0-9a-f]{1,4}){1,7}",
        r"|(?:[0-9a-f]{1,4}:){1,7}:",
        r"|::1",
        r"|::",
        r")"
    ))
    .expect("IPv6 regex is valid")
});

static INLINE_PORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?-u:\b)([A-Za-z0-9_.\-]*port[A-Za-z0-9_.\-]*)\s*[:=\s]\s*["']?([0-9]{2,5})["']?(?-u:\b)"#,
    )
    .expect("inline port regex is valid")
});

/// Returns the first IPv4 literal found anywhere in `text`.
pub fn find_first_ipv4(text: &str) -> Option<&str> {
    IPV4_RE.find(text).map(|m| m.as_str())
}

/// Returns the first IPv6 literal (full, compressed, `::1` or `::`) in `text`.
pub fn find_first_ipv6(text: &str) -> Option<&str> {
    IPV6_RE.find(text).map(|m| m.as_str())
}

/// Finds an IP address in an unstructured line, preferring IPv4.
pub fn find_first_ip(text: &str) -> Option<&str> {
    find_first_ipv4(text).or_else(|| find_first_ipv6(text))
}

/// Returns `true` if the value, with one layer of quotes removed, contains an
/// IPv4 or IPv6 literal.
pub fn looks_like_ip(value: &str) -> bool {
    let stripped = strip_quotes(value);
    IPV4_RE.is_match(stripped) || IPV6_RE.is_match(stripped)
}

/// Decides whether a key/value pair describes a network port.
///
/// The key must contain `port` (case-insensitive) and the unquoted value must
/// be 2 to 5 ASCII digits. `00` and `99999` both pass; the numeric range is
/// not checked.
pub fn looks_like_port(key: &str, value: &str) -> bool {
    if !key.to_ascii_lowercase().contains("port") {
        return false;
    }
    let stripped = strip_quotes(value);
    (2..=5).contains(&stripped.len()) && stripped.bytes().all(|b| b.is_ascii_digit())
}

/// Searches a free-form line for a `...port... <sep> <digits>` token.
///
/// # Arguments
/// * `line`: A line that did not classify as a clean key/value pair.
///
/// # Returns
/// The first `(key, value)` found, where the key contains `port` and the value
/// is a 2-5 digit number with any surrounding quotes dropped.
pub fn find_inline_port(line: &str) -> Option<(String, String)> {
    INLINE_PORT_RE
        .captures(line)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_ip() {
        let cases = [
            ("192.168.1.1", true),
            ("10.0.0.1", true),
            ("255.255.255.255", true),
            ("0.0.0.0", true),
            ("::1", true),
            ("2001:db8::1", true),
            ("\"192.168.1.1\"", true),
            ("'10.0.0.1'", true),
            ("not.an.ip", false),
            ("256.256.256.256", false),
            ("192.168.1.256", false),
            ("192.168.1", false),
            ("", false),
        ];
        for (input, want) in cases {
            assert_eq!(looks_like_ip(input), want, "looks_like_ip({input:?})");
        }
    }

    #[test]
    fn test_ipv6_forms() {
        for input in [
            "::1",
            "2001:db8::1",
            "fe80::1",
            "2001:0db8:85a3:0000:0000:8a2e:0370:7334",
            "hello ::1 world",
        ] {
            assert!(find_first_ipv6(input).is_some(), "expected IPv6 in {input:?}");
        }
        assert_eq!(find_first_ipv6("not:an:ipv6"), None);
        assert_eq!(
            find_first_ipv6("addr 2001:0db8:85a3:0000:0000:8a2e:0370:7334 end"),
            Some("2001:0db8:85a3:0000:0000:8a2e:0370:7334")
        );
    }

    #[test]
    fn test_non_ascii_neighbours_do_not_hide_addresses() {
        assert_eq!(find_first_ip("é10.0.0.1"), Some("10.0.0.1"));
        assert_eq!(find_first_ipv4("адрес:10.0.0.2ü"), Some("10.0.0.2"));
    }

    #[test]
    fn test_find_first_ip_prefers_ipv4() {
        assert_eq!(find_first_ip("connect to 192.168.1.1:8080"), Some("192.168.1.1"));
        assert_eq!(
            find_first_ip("server at 10.0.0.1 and backup at 10.0.0.2"),
            Some("10.0.0.1")
        );
        assert_eq!(find_first_ip("IPv6 address 2001:db8::1"), Some("2001:db8::1"));
        assert_eq!(find_first_ip("mixed 2001:db8::1 and 192.168.1.1"), Some("192.168.1.1"));
        assert_eq!(find_first_ip("no ip here"), None);
    }

    #[test]
    fn test_looks_like_port() {
        let cases = [
            ("server.port", "8080", true),
            ("database_port", "5432", true),
            ("PORT", "80", true),
            ("httpPort", "3000", true),
            ("port", "22", true),
            ("port", "65535", true),
            ("port", "\"8080\"", true),
            ("port", "'3000'", true),
            ("port", "99999", true),
            ("port", "00", true),
            ("timeout", "30", false),
            ("timeout", "5000", false),
            ("port", "abc", false),
            ("port", "1", false),
            ("port", "123456", false),
            ("port", "80a", false),
        ];
        for (key, value, want) in cases {
            assert_eq!(looks_like_port(key, value), want, "looks_like_port({key:?}, {value:?})");
        }
    }

    #[test]
    fn test_find_inline_port() {
        let pair = |k: &str, v: &str| Some((k.to_string(), v.to_string()));
        assert_eq!(find_inline_port("server_port: 8080"), pair("server_port", "8080"));
        assert_eq!(find_inline_port("connect to serverPort=3000"), pair("serverPort", "3000"));
        assert_eq!(find_inline_port("httpPort \"8080\""), pair("httpPort", "8080"));
        assert_eq!(find_inline_port("port '3000'"), pair("port", "3000"));
        assert_eq!(find_inline_port("database.port = 5432"), pair("database.port", "5432"));
        assert_eq!(find_inline_port("no port here"), None);
        assert_eq!(find_inline_port("port value is too short: 1"), None);
        assert_eq!(find_inline_port("port: 999999"), None);
        assert_eq!(find_inline_port("timeout: 30"), None);
        assert_eq!(find_inline_port("connect to 192.168.1.1:8080"), None);
        assert_eq!(find_inline_port("éport=8080"), pair("port", "8080"));
    }
}
