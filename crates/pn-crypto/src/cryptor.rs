use crate::error::CryptoError;

/// An encrypted message split into its ciphertext and whatever
/// out-of-band metadata (an IV, typically) the scheme needs to decrypt
/// it again.
pub struct EncryptedData {
    pub ciphertext: Vec<u8>,
    pub metadata: Vec<u8>,
}

/// A symmetric message cipher identified by a 4-byte algorithm tag that
/// travels in the envelope header.
pub trait Cryptor {
    fn identifier(&self) -> [u8; 4];
    fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedData, CryptoError>;
    fn decrypt(&self, data: &EncryptedData) -> Result<Vec<u8>, CryptoError>;
}
