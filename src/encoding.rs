//! Legacy character-encoding repair for bank files.
//!
//! Brazilian CNAB files are exchanged as Windows-1252 / ISO-8859-1 bytes.
//! This module converts between those single-byte encodings and UTF-8, and
//! repairs content that was UTF-8 encoded more than once along the way.
//!
//! Conversion is lossy by design: bytes and characters with no mapping pass
//! through unchanged, matching the behavior of legacy bank tooling. No
//! function here returns an error.

use encoding_rs::WINDOWS_1252;

/// Convert raw bytes to a UTF-8 string.
///
/// Bytes that already form a valid UTF-8 sequence (2, 3 or 4 bytes with
/// correct continuation bytes) are copied unchanged. Any other byte is
/// interpreted as a single Windows-1252 code point, including the
/// 0x80–0x9F range (€, „, …, † and friends).
pub fn to_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        if b < 0x80 {
            out.push(b as char);
            pos += 1;
            continue;
        }

        let seq_len = utf8_sequence_len(b);
        if seq_len > 0 && pos + seq_len <= bytes.len() {
            let candidate = &bytes[pos..pos + seq_len];
            if let Ok(s) = std::str::from_utf8(candidate) {
                out.push_str(s);
                pos += seq_len;
                continue;
            }
        }

        // Stray byte: decode it as a single Windows-1252 code point.
        out.push(win1252_char(b));
        pos += 1;
    }

    out
}

/// Convert a string to Windows-1252 bytes.
///
/// Characters with a Windows-1252 mapping become their single byte.
/// Unmappable characters pass through as their UTF-8 bytes unchanged.
pub fn to_win1252(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match win1252_byte(ch) {
            Some(b) => out.push(b),
            None => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out
}

/// Convert a string to ISO-8859-1 (Latin-1) bytes.
///
/// Same pass-through policy as [`to_win1252`]; the two encodings differ
/// only in the 0x80–0x9F range.
pub fn to_latin1(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let cp = ch as u32;
        if cp <= 0xFF {
            out.push(cp as u8);
        } else {
            let mut buf = [0u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
    }
    out
}

/// Repair double-encoded UTF-8 by decoding and re-encoding until the text
/// stabilizes.
///
/// Content that went through `to_utf8` twice (a common accident when two
/// systems both "fix" the same file) shows up as sequences like `Ã©` where
/// `é` was meant. Each round trip through Windows-1252 unwinds one layer.
///
/// This function is idempotent: `fix_utf8(fix_utf8(s)) == fix_utf8(s)`.
pub fn fix_utf8(text: &str) -> String {
    let mut current = text.to_string();
    // Bounded: each round either shrinks the text or leaves it unchanged.
    for _ in 0..8 {
        let next = to_utf8(&to_win1252(&current));
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn utf8_sequence_len(leading: u8) -> usize {
    match leading {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

/// Decode one Windows-1252 byte to its character.
fn win1252_char(b: u8) -> char {
    let bytes = [b];
    let (decoded, _, _) = WINDOWS_1252.decode(&bytes);
    decoded.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Encode one character to its Windows-1252 byte, if a mapping exists.
fn win1252_byte(ch: char) -> Option<u8> {
    if ch.is_ascii() {
        return Some(ch as u8);
    }
    let mut buf = [0u8; 4];
    let s = ch.encode_utf8(&mut buf);
    let (encoded, _, had_unmappable) = WINDOWS_1252.encode(s);
    if had_unmappable || encoded.len() != 1 {
        None
    } else {
        Some(encoded[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ascii_passes_through() {
        assert_eq!(to_utf8(b"REMESSA 01 COBRANCA"), "REMESSA 01 COBRANCA");
        assert_eq!(to_win1252("REMESSA 01 COBRANCA"), b"REMESSA 01 COBRANCA");
    }

    #[test]
    fn test_latin1_bytes_become_utf8() {
        // "SÃO JOSÉ" as ISO-8859-1 bytes
        let bytes = b"S\xC3O JOS\xC9";
        assert_eq!(to_utf8(bytes), "SÃO JOSÉ");
    }

    #[test]
    fn test_valid_utf8_is_kept() {
        let text = "cobrança";
        assert_eq!(to_utf8(text.as_bytes()), text);
    }

    #[test]
    fn test_control_range_table() {
        // 0x80 is € and 0x85 is … in Windows-1252, not C1 controls.
        assert_eq!(to_utf8(&[0x80]), "€");
        assert_eq!(to_utf8(&[0x85]), "…");
        assert_eq!(to_win1252("€"), vec![0x80]);
    }

    #[test]
    fn test_win1252_round_trip() {
        let text = "Avenida São João, nº 12 — cobrança";
        let bytes = to_win1252(text);
        assert_eq!(to_utf8(&bytes), text);
    }

    #[test]
    fn test_latin1_round_trip() {
        // 0xA0-0xFF agrees between Latin-1 and Windows-1252.
        let text = "Avenida São João, nº 12 ± cobrança";
        let bytes = to_latin1(text);
        assert_eq!(bytes, to_win1252(text));
        assert_eq!(to_utf8(&bytes), text);
        // No Latin-1 byte above 0xFF: multi-byte chars pass through.
        assert_eq!(to_latin1("あ"), "あ".as_bytes());
        // € is 0x80 in Windows-1252 but not a Latin-1 code point.
        assert_eq!(to_latin1("€"), "€".as_bytes());
    }

    #[test]
    fn test_unmappable_char_passes_through() {
        // No Windows-1252 byte for 'あ'; its UTF-8 bytes survive unchanged.
        let bytes = to_win1252("あ");
        assert_eq!(bytes, "あ".as_bytes());
    }

    #[test]
    fn test_fix_utf8_repairs_double_encoding() {
        let original = "cobrança";
        // Mangle: every UTF-8 byte read as if it were a Windows-1252 char.
        let mangled: String = original.bytes().map(win1252_char).collect();
        assert_eq!(mangled, "cobranÃ§a");
        assert_eq!(fix_utf8(&mangled), original);
    }

    #[test]
    fn test_fix_utf8_is_idempotent() {
        for sample in ["cobrança", "ASCII only", "José — Ávila", "€…†"] {
            let once = fix_utf8(sample);
            assert_eq!(fix_utf8(&once), once);
        }
    }
}
