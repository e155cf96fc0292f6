//! Message-payload encryption: the legacy and AES-CBC cipher schemes,
//! and the self-describing envelope (§4.6) that lets a receiver pick the
//! right scheme without being told out of band which one was used.

pub mod aes_cbc;
pub mod cryptor;
pub mod error;
pub mod header;
pub mod key;
pub mod legacy;

pub use aes_cbc::AesCbcCryptor;
pub use cryptor::{Cryptor, EncryptedData};
pub use error::CryptoError;
pub use legacy::LegacyCryptor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Encrypt `plaintext` and base64-encode the result for transport as a
/// message payload. The legacy scheme (`0000`) carries no envelope
/// header at all on the wire — it is indistinguishable base64 ciphertext,
/// per spec §4.6 — every other scheme is prefixed with the `PNED` header.
pub fn encrypt_message(cryptor: &dyn Cryptor, plaintext: &[u8]) -> Result<String, CryptoError> {
    let encrypted = cryptor.encrypt(plaintext)?;

    if cryptor.identifier() == header::LEGACY_IDENTIFIER {
        return Ok(BASE64.encode(&encrypted.ciphertext));
    }

    let head = header::encode(&header::HeaderV1 {
        identifier: cryptor.identifier(),
        metadata_len: encrypted.metadata.len(),
    });

    let mut envelope = Vec::with_capacity(head.len() + encrypted.metadata.len() + encrypted.ciphertext.len());
    envelope.extend_from_slice(&head);
    envelope.extend_from_slice(&encrypted.metadata);
    envelope.extend_from_slice(&encrypted.ciphertext);

    Ok(BASE64.encode(envelope))
}

/// Decrypt a base64 envelope produced by [`encrypt_message`], picking
/// the cryptor from `cryptors` whose identifier matches the header. A
/// payload with no `PNED` sentinel is assumed to be the legacy scheme's
/// headerless ciphertext, per spec §4.6 ("decryption ... otherwise
/// assumes legacy").
pub fn decrypt_message(cryptors: &[&dyn Cryptor], base64_str: &str) -> Result<Vec<u8>, CryptoError> {
    let envelope = BASE64.decode(base64_str)?;

    let (identifier, metadata, ciphertext) = match header::decode(&envelope) {
        Ok((head, consumed)) => {
            let metadata_end = consumed + head.metadata_len;
            if envelope.len() < metadata_end {
                return Err(CryptoError::BadMetadata);
            }
            (
                head.identifier,
                envelope[consumed..metadata_end].to_vec(),
                envelope[metadata_end..].to_vec(),
            )
        }
        Err(header::HeaderError::MissingSentinel | header::HeaderError::Truncated) => {
            (header::LEGACY_IDENTIFIER, Vec::new(), envelope)
        }
        Err(err) => return Err(err.into()),
    };

    let cryptor = cryptors
        .iter()
        .find(|c| c.identifier() == identifier)
        .ok_or(CryptoError::UnknownIdentifier(identifier))?;
    cryptor.decrypt(&EncryptedData { ciphertext, metadata })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes_cbc_envelope_round_trips() {
        let cryptor = AesCbcCryptor::new(b"shared-secret");
        let plaintext = b"{\"hello\":\"world\"}";
        let wire = encrypt_message(&cryptor, plaintext).unwrap();
        let cryptors: Vec<&dyn Cryptor> = vec![&cryptor];
        let decrypted = decrypt_message(&cryptors, &wire).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn legacy_envelope_round_trips() {
        let cryptor = LegacyCryptor::new(b"shared-secret");
        let plaintext = b"legacy payload";
        let wire = encrypt_message(&cryptor, plaintext).unwrap();
        let cryptors: Vec<&dyn Cryptor> = vec![&cryptor];
        let decrypted = decrypt_message(&cryptors, &wire).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn decrypt_picks_matching_cryptor_from_registry() {
        let aes = AesCbcCryptor::new(b"shared-secret");
        let legacy = LegacyCryptor::new(b"shared-secret");
        let wire = encrypt_message(&legacy, b"route me to legacy").unwrap();

        let cryptors: Vec<&dyn Cryptor> = vec![&aes, &legacy];
        let decrypted = decrypt_message(&cryptors, &wire).unwrap();
        assert_eq!(decrypted, b"route me to legacy");
    }

    #[test]
    fn decrypt_with_no_matching_identifier_errors() {
        let aes = AesCbcCryptor::new(b"shared-secret");
        let legacy = LegacyCryptor::new(b"shared-secret");
        let wire = encrypt_message(&legacy, b"payload").unwrap();

        let cryptors: Vec<&dyn Cryptor> = vec![&aes];
        assert!(matches!(
            decrypt_message(&cryptors, &wire),
            Err(CryptoError::UnknownIdentifier(_))
        ));
    }

    #[test]
    fn aes_cbc_wire_form_starts_with_envelope_header() {
        let cryptor = AesCbcCryptor::new(b"shared-secret");
        let wire = encrypt_message(&cryptor, b"\"hello\"").unwrap();
        let envelope = BASE64.decode(wire).unwrap();
        assert_eq!(&envelope[0..10], b"PNED\x01ACRH\x10");
        assert!(envelope.len() > 10 + 16, "header + IV + ciphertext expected");
    }

    #[test]
    fn legacy_wire_form_carries_no_header() {
        let cryptor = LegacyCryptor::new(b"shared-secret");
        let wire = encrypt_message(&cryptor, b"\"hello\"").unwrap();
        let envelope = BASE64.decode(wire).unwrap();
        assert_ne!(&envelope[0..4.min(envelope.len())], b"PNED");
    }
}
