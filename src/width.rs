//! Display width of styled terminal text.
//!
//! The scanner measures columns with a [`DisplayWidth`] implementation. The
//! default, [`AnsiWidth`], skips escape sequences (CSI, OSC, two-byte escapes
//! and region markers) and control characters, and measures everything else
//! with `unicode-width`. Any `Fn(&str) -> usize` can be used instead, e.g. the
//! width function of the styling engine that produced the frame.

use unicode_width::UnicodeWidthStr;

use crate::marker;

/// Measures how many terminal cells a piece of text occupies.
pub trait DisplayWidth: Send + Sync {
    fn width(&self, text: &str) -> usize;
}

impl<F> DisplayWidth for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn width(&self, text: &str) -> usize {
        self(text)
    }
}

/// Escape-sequence aware width function.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiWidth;

impl DisplayWidth for AnsiWidth {
    fn width(&self, text: &str) -> usize {
        display_width(text)
    }
}

/// Width of `text` in terminal cells, ignoring escape sequences and controls.
pub fn display_width(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut total = 0;
    let mut run_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let skip = if bytes[i] == marker::OPEN_BYTE {
            escape_len(&bytes[i..])
        } else {
            // Safe to index: `i` always sits on a char boundary.
            match text[i..].chars().next() {
                Some(c) if c.is_control() => c.len_utf8(),
                Some(c) => {
                    i += c.len_utf8();
                    continue;
                }
                None => break,
            }
        };

        total += text[run_start..i].width();
        i += skip;
        run_start = i;
    }

    total + text[run_start..].width()
}

/// Byte length of the escape sequence starting at `bytes[0] == ESC`.
///
/// Truncated sequences consume the rest of the input, the way a terminal
/// would swallow them.
fn escape_len(bytes: &[u8]) -> usize {
    if let Some((_, len)) = marker::try_parse(bytes) {
        return len;
    }

    match bytes.get(1) {
        // CSI: parameters and intermediates, then one final byte in 0x40..=0x7e.
        Some(b'[') => bytes[2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map_or(bytes.len(), |p| p + 3),
        // OSC: terminated by BEL or ESC \.
        Some(b']') => {
            let mut j = 2;
            while j < bytes.len() {
                match bytes[j] {
                    0x07 => return j + 1,
                    0x1b if bytes.get(j + 1) == Some(&b'\\') => return j + 2,
                    _ => j += 1,
                }
            }
            bytes.len()
        }
        // Two-byte escape. Only skip the second byte when it is ASCII so
        // the cursor never lands inside a multi-byte char.
        Some(b) if b.is_ascii() => 2,
        _ => 1,
    }
}
