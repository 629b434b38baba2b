//! Hex helpers shared by every decoder.

use crate::error::DecodeError;

/// Strip an optional `0x` / `0X` prefix.
pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode hex text, with or without a `0x` prefix. Surrounding whitespace is ignored.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, DecodeError> {
    let body = strip_0x(s.trim());
    hex::decode(body).map_err(|e| DecodeError::InvalidHex {
        reason: e.to_string(),
    })
}

/// Like [`decode_hex`] but an odd-length input is right-padded with a `0` nibble.
pub fn decode_hex_padded(s: &str) -> Result<Vec<u8>, DecodeError> {
    let body = strip_0x(s.trim());
    if body.len() % 2 == 0 {
        return decode_hex(body);
    }
    decode_hex(&format!("{body}0"))
}

/// `0x`-prefixed lowercase hex.
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse an 8-hex-char selector, with or without `0x`.
pub fn parse_selector(s: &str) -> Result<[u8; 4], DecodeError> {
    let bytes = decode_hex(s)?;
    <[u8; 4]>::try_from(bytes.as_slice()).map_err(|_| DecodeError::InvalidHex {
        reason: format!("selector must be 4 bytes, got {}", bytes.len()),
    })
}

/// The first four bytes of `data`, if there are that many.
pub fn leading_selector(data: &[u8]) -> Option<[u8; 4]> {
    data.get(..4).and_then(|s| <[u8; 4]>::try_from(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_optional() {
        assert_eq!(decode_hex("0xa9059cbb").unwrap(), vec![0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(decode_hex("a9059cbb").unwrap(), vec![0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(decode_hex("  0XA9059CBB\n").unwrap(), vec![0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn odd_length_is_an_error_unless_padded() {
        assert!(decode_hex("0xabc").is_err());
        assert_eq!(decode_hex_padded("0xabc").unwrap(), vec![0xab, 0xc0]);
    }

    #[test]
    fn selector_parsing() {
        assert_eq!(parse_selector("0x3593564c").unwrap(), [0x35, 0x93, 0x56, 0x4c]);
        assert!(parse_selector("0x3593").is_err());
        assert_eq!(leading_selector(&[1, 2, 3]), None);
        assert_eq!(leading_selector(&[1, 2, 3, 4, 5]), Some([1, 2, 3, 4]));
    }

    #[test]
    fn encode_is_prefixed_lowercase() {
        assert_eq!(encode_hex([0xAB, 0x01]), "0xab01");
    }
}
