use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HttpError {
    #[error("malformed HTTP status line or headers")]
    Malformed,
    #[error("response body length is ambiguous (no Content-Length or Transfer-Encoding)")]
    FormatError,
    #[error("chunked transfer encoding framing is invalid")]
    ChunkedFraming,
    #[error("response body exceeds the configured maximum size")]
    ReplyTooBig,
    #[error("gzip payload is corrupt or truncated")]
    BadCompression,
}
