use pn_protocol::Outcome;
use thiserror::Error;

/// The result of a failed transaction. Every non-success path the
/// transaction engine can take collapses to one of these outcome codes;
/// [`Outcome::Ok`] never appears here since a successful call returns its
/// parsed payload directly instead.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transaction outcome: {0}")]
    Outcome(Outcome),
    #[error("an operation is already in progress on this context")]
    InProgress,
    #[error("request build: {0}")]
    Build(String),
}

impl ClientError {
    pub fn outcome(&self) -> Outcome {
        match self {
            ClientError::Outcome(o) => *o,
            ClientError::InProgress => Outcome::InternalError,
            ClientError::Build(_) => Outcome::TxBuffTooSmall,
        }
    }
}

impl From<Outcome> for ClientError {
    fn from(o: Outcome) -> Self {
        ClientError::Outcome(o)
    }
}

impl From<pn_transport::TransportError> for ClientError {
    fn from(err: pn_transport::TransportError) -> Self {
        use pn_transport::TransportError as T;
        let outcome = match err {
            T::Resolve { .. } => Outcome::AddrResolutionFailed,
            T::ConnectExhausted { .. } => Outcome::ConnectFailed,
            T::Tls(_) => Outcome::ConnectFailed,
            T::Io(_) => Outcome::IoError,
            T::BadCertificate => Outcome::ConnectFailed,
        };
        ClientError::Outcome(outcome)
    }
}

impl From<pn_http::HttpError> for ClientError {
    fn from(err: pn_http::HttpError) -> Self {
        use pn_http::HttpError as H;
        let outcome = match err {
            H::Malformed => Outcome::HttpError,
            H::FormatError => Outcome::FormatError,
            H::ChunkedFraming => Outcome::HttpError,
            H::ReplyTooBig => Outcome::ReplyTooBig,
            H::BadCompression => Outcome::FormatError,
        };
        ClientError::Outcome(outcome)
    }
}

impl From<pn_crypto::CryptoError> for ClientError {
    fn from(_: pn_crypto::CryptoError) -> Self {
        ClientError::Outcome(Outcome::CryptoNotSupported)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(_: std::io::Error) -> Self {
        ClientError::Outcome(Outcome::IoError)
    }
}
