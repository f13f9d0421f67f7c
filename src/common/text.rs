//! Latin-1 text handling for fixed-width tag fields.
//!
//! ID3v1 text fields are Latin-1, NUL or space padded to a fixed width.
//! Padding is not semantically meaningful; it is stripped on decode and
//! regenerated on encode.

/// Decode a fixed-width Latin-1 field, stripping NUL/space padding.
///
/// Content stops at the first NUL byte; trailing spaces are also removed.
pub fn decode_fixed(data: &[u8]) -> String {
    let end = memchr::memchr(0, data).unwrap_or(data.len());
    if data[end..].iter().any(|&b| b != 0) {
        log::warn!("text field contains junk after the NUL terminator");
    }
    let s = decode_latin1(&data[..end]);
    s.trim_end().to_string()
}

/// Decode Latin-1 bytes into a `String`.
pub fn decode_latin1(data: &[u8]) -> String {
    // Fast path: ASCII is valid UTF-8 as-is
    if data.is_ascii() {
        // SAFETY: all bytes are ASCII
        unsafe { String::from_utf8_unchecked(data.to_vec()) }
    } else {
        data.iter().map(|&b| b as char).collect()
    }
}

/// Encode text as Latin-1, replacing unrepresentable characters with `?`.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if c as u32 <= 0xFF { c as u8 } else { b'?' })
        .collect()
}

/// Encode `text` into a fixed-width Latin-1 field of `width` bytes,
/// truncating over-long input and NUL-padding the remainder.
///
/// Total function of its inputs; never fails.
pub fn encode_fixed(text: &str, width: usize) -> Vec<u8> {
    let mut field = encode_latin1(text);
    field.truncate(width);
    field.resize(width, 0);
    field
}

/// Truncate `text` in place so its Latin-1 encoding fits in `width` bytes.
/// Latin-1 encodes one byte per char, so this is a char-count cut.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
