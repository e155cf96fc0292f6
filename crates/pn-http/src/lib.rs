//! HTTP/1.1 response framing: status line and header parsing, chunked
//! transfer-decoding, and gzip content-decoding. No request formatting
//! here — transaction modules build request lines themselves and this
//! crate only ever reads a response back off the wire.

pub mod chunked;
pub mod error;
pub mod gzip;
pub mod head;

pub use chunked::ChunkedDecoder;
pub use error::HttpError;
pub use head::{BodyMode, ResponseHead, body_mode, parse_head};
