//! Decoding raw file bytes into script text.

use encoding_rs::{UTF_8, WINDOWS_1252};

/// Decodes the bytes of one script file.
///
/// Game files are UTF-8, usually with a byte order mark; older mods are often
/// Windows-1252. Bytes that are not valid UTF-8 are decoded as Windows-1252.
pub fn decode(bytes: &[u8]) -> String {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if !had_errors {
        return text.into_owned();
    }

    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_with_bom() {
        let bytes = b"\xEF\xBB\xBFname = caf\xC3\xA9";
        assert_eq!(decode(bytes), "name = café");
    }

    #[test]
    fn test_windows_1252_fallback() {
        let bytes = b"name = caf\xE9";
        assert_eq!(decode(bytes), "name = café");
    }
}
