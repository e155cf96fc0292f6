use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::cryptor::{Cryptor, EncryptedData};
use crate::error::CryptoError;
use crate::header::LEGACY_IDENTIFIER;
use crate::key;

type Enc = cbc::Encryptor<aes::Aes256>;
type Dec = cbc::Decryptor<aes::Aes256>;

// Every legacy-scheme message is encrypted with this same IV. Carried
// exactly as-is for wire compatibility with older clients; new messages
// should use the AES-CBC scheme instead.
const FIXED_IV: &[u8; 16] = b"0123456789012345";

pub struct LegacyCryptor {
    key: [u8; key::KEY_LEN],
}

impl LegacyCryptor {
    pub fn new(cipher_key: &[u8]) -> Self {
        LegacyCryptor {
            key: key::cipher_key_hash(cipher_key),
        }
    }
}

impl Cryptor for LegacyCryptor {
    fn identifier(&self) -> [u8; 4] {
        LEGACY_IDENTIFIER
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedData, CryptoError> {
        let ciphertext =
            Enc::new(&self.key.into(), FIXED_IV.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);
        Ok(EncryptedData {
            ciphertext,
            metadata: Vec::new(),
        })
    }

    fn decrypt(&self, data: &EncryptedData) -> Result<Vec<u8>, CryptoError> {
        if data.ciphertext.len() % 16 != 0 || data.ciphertext.is_empty() {
            return Err(CryptoError::BadBlockLength);
        }
        Dec::new(&self.key.into(), FIXED_IV.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&data.ciphertext)
            .map_err(|_| CryptoError::BadPadding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_plaintext() {
        let cryptor = LegacyCryptor::new(b"my-cipher-key");
        let plaintext = b"hello, world";
        let encrypted = cryptor.encrypt(plaintext).unwrap();
        assert!(encrypted.metadata.is_empty());
        assert_eq!(cryptor.decrypt(&encrypted).unwrap(), plaintext);
    }

    #[test]
    fn same_plaintext_same_key_is_deterministic() {
        let cryptor = LegacyCryptor::new(b"my-cipher-key");
        let a = cryptor.encrypt(b"payload").unwrap();
        let b = cryptor.encrypt(b"payload").unwrap();
        assert_eq!(a.ciphertext, b.ciphertext);
    }
}
