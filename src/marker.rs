//! Marker codec.
//!
//! A marker is `ESC <decimal token> ST`, where ST is the C1 string terminator
//! `U+009C` (UTF-8 `C2 9C`). Both sentinels are zero width for the width
//! function, and `ESC` followed by a digit is not the prefix of any SGR/CSI/OSC
//! sequence a styling engine emits, so markers survive composition untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opening sentinel of a marker.
pub const SENTINEL_OPEN: char = '\u{1b}';

/// Closing sentinel of a marker.
pub const SENTINEL_CLOSE: char = '\u{9c}';

pub(crate) const OPEN_BYTE: u8 = 0x1b;
const CLOSE_BYTES: [u8; 2] = [0xc2, 0x9c];

/// Numeric stand-in for a region name inside a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Token(u64);

impl Token {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encode a token as a marker.
pub fn wrap(token: Token) -> String {
    format!("{SENTINEL_OPEN}{}{SENTINEL_CLOSE}", token.0)
}

/// Try to decode a marker at the start of `window`.
///
/// Returns the token and the number of bytes the marker occupies. Anything
/// that is not exactly `ESC digits ST` is foreign data and yields `None`:
/// a missing terminator, an empty or non-digit payload, or a payload too
/// large for a token.
pub fn try_parse(window: &[u8]) -> Option<(Token, usize)> {
    let rest = window.strip_prefix(&[OPEN_BYTE])?;

    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || !rest[digits..].starts_with(&CLOSE_BYTES) {
        return None;
    }

    let payload = std::str::from_utf8(&rest[..digits]).ok()?;
    let value = payload.parse::<u64>().ok()?;

    Some((Token(value), 1 + digits + CLOSE_BYTES.len()))
}

/// [`try_parse`] over a string slice.
pub fn try_parse_str(window: &str) -> Option<(Token, usize)> {
    try_parse(window.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_format() {
        assert_eq!(wrap(Token::new(501)), "\x1b501\u{9c}");
        assert_eq!(wrap(Token::new(0)), "\x1b0\u{9c}");
    }

    #[test]
    fn test_parse_wrapped() {
        let marker = wrap(Token::new(742));
        assert_eq!(try_parse_str(&marker), Some((Token::new(742), marker.len())));
    }

    #[test]
    fn test_parse_ignores_trailing_data() {
        let input = format!("{}rest of the line", wrap(Token::new(9)));
        let (token, len) = try_parse_str(&input).unwrap();
        assert_eq!(token, Token::new(9));
        assert_eq!(&input[len..], "rest of the line");
    }

    #[test]
    fn test_parse_requires_open_sentinel() {
        assert_eq!(try_parse_str("501\u{9c}"), None);
        assert_eq!(try_parse_str(""), None);
    }

    #[test]
    fn test_parse_truncated_marker() {
        assert_eq!(try_parse_str("\x1b"), None);
        assert_eq!(try_parse_str("\x1b501"), None);
        // First byte of ST only.
        assert_eq!(try_parse(b"\x1b501\xc2"), None);
    }

    #[test]
    fn test_parse_rejects_non_digit_payload() {
        assert_eq!(try_parse_str("\x1b[31m\u{9c}"), None);
        assert_eq!(try_parse_str("\x1b5a1\u{9c}"), None);
        assert_eq!(try_parse_str("\x1b\u{9c}"), None);
        // Non-ASCII digits are not token digits.
        assert_eq!(try_parse_str("\x1b\u{0663}\u{9c}"), None);
    }

    #[test]
    fn test_parse_rejects_styling_sequences() {
        assert_eq!(try_parse_str("\x1b[1;32m"), None);
        assert_eq!(try_parse_str("\x1b]0;title\x07"), None);
        assert_eq!(try_parse_str("\x1b7"), None);
    }

    #[test]
    fn test_parse_rejects_overflowing_payload() {
        let input = format!("\x1b{}\u{9c}", "9".repeat(30));
        assert_eq!(try_parse_str(&input), None);
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::new(1234).to_string(), "1234");
        assert_eq!(Token::new(77).get(), 77);
    }
}
