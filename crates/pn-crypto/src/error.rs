use thiserror::Error;

use crate::header::HeaderError;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("envelope header: {0}")]
    Header(#[from] HeaderError),
    #[error("ciphertext is not a whole number of cipher blocks")]
    BadBlockLength,
    #[error("padding is invalid or the wrong key/IV was used")]
    BadPadding,
    #[error("envelope metadata is the wrong size for this cryptor")]
    BadMetadata,
    #[error("envelope identifier does not match any registered cryptor")]
    UnknownIdentifier([u8; 4]),
    #[error("base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),
}
