//! Java "modified UTF-8", the string encoding of `writeUTF`.
//!
//! It differs from UTF-8 in two ways: NUL is written as `C0 80`, and
//! characters outside the BMP are written as a surrogate pair of two
//! three-byte sequences.

use std::fmt;

use bytes::Bytes;

/// Decode modified UTF-8 into a `String`.
///
/// Bytes that are not valid in either encoding become `U+FFFD`.
pub fn decode_modified_utf8(raw: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(raw) {
        return text.to_string();
    }

    let mut units: Vec<u16> = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b0 = raw[i];
        if b0 & 0x80 == 0 {
            units.push(u16::from(b0));
            i += 1;
        } else if b0 & 0xE0 == 0xC0 && i + 1 < raw.len() && raw[i + 1] & 0xC0 == 0x80 {
            units.push((u16::from(b0 & 0x1F) << 6) | u16::from(raw[i + 1] & 0x3F));
            i += 2;
        } else if b0 & 0xF0 == 0xE0
            && i + 2 < raw.len()
            && raw[i + 1] & 0xC0 == 0x80
            && raw[i + 2] & 0xC0 == 0x80
        {
            units.push(
                (u16::from(b0 & 0x0F) << 12)
                    | (u16::from(raw[i + 1] & 0x3F) << 6)
                    | u16::from(raw[i + 2] & 0x3F),
            );
            i += 3;
        } else {
            units.push(0xFFFD);
            i += 1;
        }
    }
    String::from_utf16_lossy(&units)
}

/// Encode text as modified UTF-8.
pub fn encode_modified_utf8(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for unit in text.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

/// A name read with `readUTF` (class, field or interface name).
///
/// The wire bytes are kept as they were read so a re-encoded stream is
/// bit-exact even when they are not valid modified UTF-8. Text is decoded
/// on demand.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ModifiedUtf8 {
    raw: Bytes,
}

impl ModifiedUtf8 {
    pub fn from_raw(raw: impl Into<Bytes>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn text(&self) -> String {
        decode_modified_utf8(&self.raw)
    }
}

impl From<&str> for ModifiedUtf8 {
    fn from(text: &str) -> Self {
        Self::from_raw(encode_modified_utf8(text))
    }
}

impl From<String> for ModifiedUtf8 {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl PartialEq<str> for ModifiedUtf8 {
    fn eq(&self, other: &str) -> bool {
        self.raw.as_ref() == encode_modified_utf8(other).as_slice()
    }
}

impl PartialEq<&str> for ModifiedUtf8 {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl fmt::Display for ModifiedUtf8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl fmt::Debug for ModifiedUtf8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.text(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_null_and_surrogates() {
        assert_eq!(decode_modified_utf8(b"plain"), "plain");
        assert_eq!(decode_modified_utf8(&[0x61, 0xC0, 0x80, 0x62]), "a\0b");
        // U+1F600 as a surrogate pair
        let smiley = [0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80];
        assert_eq!(decode_modified_utf8(&smiley), "\u{1F600}");
    }

    #[test]
    fn encode_null_and_surrogates() {
        assert_eq!(encode_modified_utf8("a\0b"), vec![0x61, 0xC0, 0x80, 0x62]);
        assert_eq!(
            encode_modified_utf8("\u{1F600}"),
            vec![0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80]
        );
        assert_eq!(encode_modified_utf8("é"), vec![0xC3, 0xA9]);
        assert_eq!(encode_modified_utf8("€"), vec![0xE2, 0x82, 0xAC]);
    }

    #[test]
    fn text_round_trips() {
        for text in ["", "java.lang.String", "a\0b", "\u{1F600}x", "日本"] {
            assert_eq!(decode_modified_utf8(&encode_modified_utf8(text)), text);
        }
    }

    #[test]
    fn invalid_bytes_are_kept_raw() {
        let name = ModifiedUtf8::from_raw(vec![0x61, 0xFF]);
        assert_eq!(name.as_bytes(), &[0x61, 0xFF]);
        assert_eq!(name.text(), "a\u{FFFD}");
        assert_ne!(name, "a\u{FFFD}");
    }

    #[test]
    fn compares_with_text() {
        let name = ModifiedUtf8::from("a\0b");
        assert_eq!(name.as_bytes(), &[0x61, 0xC0, 0x80, 0x62]);
        assert_eq!(name, "a\0b");
        assert_eq!(format!("{name:?}"), "\"a\\0b\"");
        assert_eq!(name.to_string(), "a\0b");
    }
}
