use sha2::{Digest, Sha256};

/// Length of the derived key material, in ASCII bytes.
pub const KEY_LEN: usize = 32;

/// Derive the AES-256 key used by both the legacy and AES-CBC schemes:
/// the lower-case hex encoding of `SHA256(cipher_key)`, truncated to the
/// first 32 hex characters (16 digest bytes). The key is used as raw
/// ASCII key material, not decoded back to binary — this is a
/// wire-compatibility requirement inherited from the origin SDK, not an
/// oversight, and both schemes must keep deriving it the same way.
pub fn cipher_key_hash(cipher_key: &[u8]) -> [u8; KEY_LEN] {
    let digest = Sha256::digest(cipher_key);
    let mut out = [0u8; KEY_LEN];
    for (i, byte) in digest.iter().take(KEY_LEN / 2).enumerate() {
        let hex = format!("{byte:02x}");
        let bytes = hex.as_bytes();
        out[i * 2] = bytes[0];
        out[i * 2 + 1] = bytes[1];
    }
    out
}
