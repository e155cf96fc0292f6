use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

use crate::cryptor::{Cryptor, EncryptedData};
use crate::error::CryptoError;
use crate::header::AES_CBC_IDENTIFIER;
use crate::key;

type Enc = cbc::Encryptor<aes::Aes256>;
type Dec = cbc::Decryptor<aes::Aes256>;

const IV_LEN: usize = 16;

/// AES-256-CBC with PKCS#7 padding and a fresh random IV per message,
/// carried as the envelope metadata.
pub struct AesCbcCryptor {
    key: [u8; key::KEY_LEN],
}

impl AesCbcCryptor {
    pub fn new(cipher_key: &[u8]) -> Self {
        AesCbcCryptor {
            key: key::cipher_key_hash(cipher_key),
        }
    }
}

impl Cryptor for AesCbcCryptor {
    fn identifier(&self) -> [u8; 4] {
        AES_CBC_IDENTIFIER
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedData, CryptoError> {
        let mut iv = [0u8; IV_LEN];
        rand::thread_rng().fill_bytes(&mut iv);
        let ciphertext =
            Enc::new(&self.key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);
        Ok(EncryptedData {
            ciphertext,
            metadata: iv.to_vec(),
        })
    }

    fn decrypt(&self, data: &EncryptedData) -> Result<Vec<u8>, CryptoError> {
        if data.metadata.len() != IV_LEN {
            return Err(CryptoError::BadMetadata);
        }
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&data.metadata);
        if data.ciphertext.len() % 16 != 0 || data.ciphertext.is_empty() {
            return Err(CryptoError::BadBlockLength);
        }
        Dec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&data.ciphertext)
            .map_err(|_| CryptoError::BadPadding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_plaintext() {
        let cryptor = AesCbcCryptor::new(b"my-cipher-key");
        let plaintext = b"the quick brown fox jumps over the lazy dog";
        let encrypted = cryptor.encrypt(plaintext).unwrap();
        assert_eq!(encrypted.metadata.len(), IV_LEN);
        let decrypted = cryptor.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn two_encryptions_use_different_ivs() {
        let cryptor = AesCbcCryptor::new(b"my-cipher-key");
        let a = cryptor.encrypt(b"payload").unwrap();
        let b = cryptor.encrypt(b"payload").unwrap();
        assert_ne!(a.metadata, b.metadata);
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let a = AesCbcCryptor::new(b"key-a");
        let b = AesCbcCryptor::new(b"key-b");
        let encrypted = a.encrypt(b"payload").unwrap();
        assert!(b.decrypt(&encrypted).is_err());
    }
}
