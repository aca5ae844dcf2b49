//! Removal of characters that cannot appear in WordprocessingML text
//!
//! XML 1.0 only allows tab, line feed, carriage return and the printable
//! Unicode ranges. Anything else (NUL, vertical tab, form feed, the
//! non-characters U+FFFE/U+FFFF, ...) makes Word reject the file, so every
//! string is passed through here before it becomes a run.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

static INVALID_XML_CHARS: OnceLock<Regex> = OnceLock::new();

fn invalid_xml_chars() -> &'static Regex {
    INVALID_XML_CHARS.get_or_init(|| {
        Regex::new(r"[^\x09\x0A\x0D\x20-\x{D7FF}\x{E000}-\x{FFFC}\x{10000}-\x{10FFFF}]")
            .expect("invalid XML character class is a valid pattern")
    })
}

/// Strip characters that are illegal in the output text encoding
///
/// Returns the input unchanged (borrowed) when it is already clean, so
/// calling this twice yields the same result as calling it once.
pub fn strip_invalid_xml_chars(text: &str) -> Cow<'_, str> {
    invalid_xml_chars().replace_all(text, "")
}
