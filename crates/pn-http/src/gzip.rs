//! Gzip response-body inflation, bounded so a malicious or misconfigured
//! origin can't exhaust memory by sending a small highly-compressible
//! payload (a "zip bomb").

use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::HttpError;

/// Inflate `compressed`, stopping with [`HttpError::ReplyTooBig`] as soon
/// as the decompressed size would exceed `max_len`.
pub fn inflate(compressed: &[u8], max_len: usize) -> Result<Vec<u8>, HttpError> {
    let mut decoder = GzDecoder::new(compressed);
    let mut out = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        let n = decoder.read(&mut chunk).map_err(|_| HttpError::BadCompression)?;
        if n == 0 {
            break;
        }
        if out.len() + n > max_len {
            return Err(HttpError::ReplyTooBig);
        }
        out.extend_from_slice(&chunk[..n]);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn inflates_round_tripped_payload() {
        let original = b"the quick brown fox jumps over the lazy dog".repeat(10);
        let compressed = gzip(&original);
        let decompressed = inflate(&compressed, original.len() + 1).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn rejects_payload_exceeding_max_len() {
        let original = b"the quick brown fox jumps over the lazy dog".repeat(10);
        let compressed = gzip(&original);
        assert_eq!(inflate(&compressed, 4), Err(HttpError::ReplyTooBig));
    }

    #[test]
    fn rejects_corrupt_gzip_stream() {
        assert_eq!(inflate(b"not gzip data", 1024), Err(HttpError::BadCompression));
    }
}
