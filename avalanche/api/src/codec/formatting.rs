// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
//! The `0x` hex form with a trailing 4 byte sha256 checksum, used for tx files and the
//! `hex` encoding of the node APIs.

use avalanche_types::formatting;

use super::CodecError;

const HEX_PREFIX: &str = "0x";
const CHECKSUM_LEN: usize = 4;

pub fn encode_hex_with_checksum(bytes: &[u8]) -> String {
    formatting::encode_hex_with_checksum(bytes)
}

/// Accepts the payload with or without the `0x` prefix and surrounding whitespace.
pub fn decode_hex_with_checksum(s: &str) -> Result<Vec<u8>, CodecError> {
    let s = s.trim();
    let raw = s.strip_prefix(HEX_PREFIX).unwrap_or(s);
    let decoded = hex::decode(raw).map_err(|e| CodecError::InvalidHex(e.to_string()))?;
    if decoded.len() < CHECKSUM_LEN {
        return Err(CodecError::InvalidHex("input too short".to_string()));
    }
    formatting::decode_hex_with_checksum(raw.as_bytes())
        .map_err(|_| CodecError::InvalidChecksum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_with_checksum() {
        let s = encode_hex_with_checksum(&[1, 2, 3]);
        assert!(s.starts_with("0x010203"));
        assert_eq!(s.len(), 2 + 2 * (3 + CHECKSUM_LEN));
        assert_eq!(decode_hex_with_checksum(&s).unwrap(), vec![1, 2, 3]);
        // trailing newline of a file
        assert_eq!(
            decode_hex_with_checksum(&format!("{s}\n")).unwrap(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_bad_payloads() {
        let mut s = encode_hex_with_checksum(&[1, 2, 3]);
        s.replace_range(2..4, "ff");
        assert_eq!(decode_hex_with_checksum(&s), Err(CodecError::InvalidChecksum));
        assert!(matches!(
            decode_hex_with_checksum("0xzz"),
            Err(CodecError::InvalidHex(_))
        ));
        assert!(decode_hex_with_checksum("0x01").is_err());
    }
}
