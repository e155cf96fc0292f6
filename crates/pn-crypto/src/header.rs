//! The cryptor header v1: a small self-describing prefix that tells the
//! receiving end which algorithm produced an encrypted message and how
//! much metadata (e.g. an IV) precedes the ciphertext.
//!
//! Layout: `"PNED"` sentinel, one version byte, a 4-byte algorithm
//! identifier, then either a single length byte (metadata shorter than
//! 255 bytes) or `0xFF` followed by a big-endian `u16` length.
//!
//! The legacy scheme never writes this header at all — see `lib.rs`'s
//! `encrypt_message`/`decrypt_message`, which special-case it.

use thiserror::Error;

pub const SENTINEL: &[u8; 4] = b"PNED";
pub const VERSION: u8 = 1;
pub const LEGACY_IDENTIFIER: [u8; 4] = *b"0000";
pub const AES_CBC_IDENTIFIER: [u8; 4] = *b"ACRH";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderV1 {
    pub identifier: [u8; 4],
    pub metadata_len: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("envelope shorter than the header's minimum size")]
    Truncated,
    #[error("envelope is missing the PNED sentinel")]
    MissingSentinel,
    #[error("unsupported cryptor header version {0}")]
    UnsupportedVersion(u8),
}

/// Encode `header` as the bytes that precede the metadata+ciphertext
/// body in an envelope.
pub fn encode(header: &HeaderV1) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    out.extend_from_slice(SENTINEL);
    out.push(VERSION);
    out.extend_from_slice(&header.identifier);
    if header.metadata_len < 255 {
        out.push(header.metadata_len as u8);
    } else {
        out.push(255);
        out.push((header.metadata_len >> 8) as u8);
        out.push((header.metadata_len & 0xFF) as u8);
    }
    out
}

/// Decode a header prefix from `buf`, returning the header and the
/// number of bytes it consumed (the metadata body starts right after).
pub fn decode(buf: &[u8]) -> Result<(HeaderV1, usize), HeaderError> {
    if buf.len() < 10 {
        return Err(HeaderError::Truncated);
    }
    if &buf[0..4] != SENTINEL {
        return Err(HeaderError::MissingSentinel);
    }
    let version = buf[4];
    if version != VERSION {
        return Err(HeaderError::UnsupportedVersion(version));
    }
    let mut identifier = [0u8; 4];
    identifier.copy_from_slice(&buf[5..9]);

    if buf[9] < 255 {
        Ok((
            HeaderV1 {
                identifier,
                metadata_len: buf[9] as usize,
            },
            10,
        ))
    } else {
        if buf.len() < 12 {
            return Err(HeaderError::Truncated);
        }
        let metadata_len = ((buf[10] as usize) << 8) | buf[11] as usize;
        Ok((
            HeaderV1 {
                identifier,
                metadata_len,
            },
            12,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_short_metadata() {
        let header = HeaderV1 {
            identifier: AES_CBC_IDENTIFIER,
            metadata_len: 16,
        };
        let encoded = encode(&header);
        let (decoded, consumed) = decode(&encoded).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn round_trips_long_metadata_via_escape_byte() {
        let header = HeaderV1 {
            identifier: LEGACY_IDENTIFIER,
            metadata_len: 600,
        };
        let encoded = encode(&header);
        assert_eq!(encoded[9], 255);
        let (decoded, consumed) = decode(&encoded).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn rejects_missing_sentinel() {
        let buf = b"XXXX\x01ACRH\x10";
        assert_eq!(decode(buf), Err(HeaderError::MissingSentinel));
    }

    #[test]
    fn rejects_truncated_buffer() {
        assert_eq!(decode(b"PNED\x01"), Err(HeaderError::Truncated));
    }

    #[test]
    fn rejects_header_missing_its_length_byte_instead_of_panicking() {
        // Sentinel + version + identifier, one byte short of the length byte.
        assert_eq!(decode(b"PNED\x01ACRH"), Err(HeaderError::Truncated));
    }

    #[test]
    fn rejects_unsupported_version() {
        let buf = b"PNED\x02ACRH\x10";
        assert_eq!(decode(buf), Err(HeaderError::UnsupportedVersion(2)));
    }
}
