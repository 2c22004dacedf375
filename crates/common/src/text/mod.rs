//! Text decoding and line counting for uploaded payloads
//!
//! Payloads are decoded as ISO-8859-1: every byte maps to the code point of
//! the same value, so arbitrary binary content decodes without error.

use tracing::debug;

/// Decode bytes as ISO-8859-1 (latin-1).
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Line boundaries recognised when splitting decoded text.
///
/// `\r\n` is handled as a single boundary by [`count_lines`].
pub fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Count lines in `text`.
///
/// A trailing boundary does not start an extra empty line, and empty input
/// has no lines.
pub fn count_lines(text: &str) -> usize {
    let mut lines = 0;
    let mut open_line = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if is_line_boundary(c) {
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            lines += 1;
            open_line = false;
        } else {
            open_line = true;
        }
    }

    if open_line {
        lines += 1;
    }
    lines
}

/// Decode an uploaded payload and count its lines.
pub fn count_payload_lines(bytes: &[u8]) -> usize {
    let lines = count_lines(&decode_latin1(bytes));
    debug!(bytes = bytes.len(), lines, "Payload lines counted");
    lines
}
