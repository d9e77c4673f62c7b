//! Dangerous-pattern detection.
//!
//! # Responsibilities
//! - Decide whether a text contains markup/entity patterns usable for XSS
//! - Report the position of the first dangerous occurrence
//!
//! # Design Decisions
//! - Single left-to-right pass, no backtracking, no allocation
//! - Only `<` and `&` can start a pattern; the character after decides
//! - A trailing lone trigger is never flagged (nothing can follow it)
//! - Named entities (`&amp;`) pass; numeric references (`&#60;`) do not

/// Characters that can start a dangerous pattern.
const TRIGGER_CHARS: [u8; 2] = [b'<', b'&'];

/// Scan `input` for the first dangerous pattern.
///
/// Returns `Some(index)` with the byte index of the triggering character, or
/// `None` when the input is safe. Triggers are ASCII, so the index always
/// falls on a character boundary.
///
/// A `<` is dangerous when followed by an ASCII letter, `!`, `/`, or `?`
/// (opening/closing tags, comment declarations, processing instructions).
/// An `&` is dangerous when followed by `#` (numeric character reference).
/// Everything else, including a trigger as the very last character, is safe.
pub fn scan(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut offset = 0;

    loop {
        let n = bytes[offset..]
            .iter()
            .position(|b| TRIGGER_CHARS.contains(b))?
            + offset;

        // Last character: nothing can follow, safe.
        if n == bytes.len() - 1 {
            return None;
        }

        let next = bytes[n + 1];
        let dangerous = match bytes[n] {
            b'<' => next.is_ascii_alphabetic() || next == b'!' || next == b'/' || next == b'?',
            _ => next == b'#',
        };

        if dangerous {
            return Some(n);
        }

        offset = n + 1;
    }
}
