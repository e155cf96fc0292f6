//! Status line and header parsing, built on `httparse`.

use crate::error::HttpError;

#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl ResponseHead {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length")?.trim().parse().ok()
    }

    pub fn is_chunked(&self) -> bool {
        self.header("transfer-encoding")
            .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
    }

    pub fn is_gzip(&self) -> bool {
        self.header("content-encoding")
            .is_some_and(|v| v.eq_ignore_ascii_case("gzip"))
    }
}

/// The body-framing strategy implied by a response's headers and status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Exactly `n` bytes follow, possibly zero.
    Fixed(usize),
    /// Body is chunk-encoded; length is unknown up front.
    Chunked,
}

/// Parse a response head from the start of `buf`. Returns `Ok(None)` if
/// `buf` doesn't yet contain a complete head (caller should read more).
pub fn parse_head(buf: &[u8]) -> Result<Option<(ResponseHead, usize)>, HttpError> {
    let mut raw_headers = [httparse::EMPTY_HEADER; 64];
    let mut response = httparse::Response::new(&mut raw_headers);

    let status = match response.parse(buf) {
        Ok(httparse::Status::Complete(n)) => n,
        Ok(httparse::Status::Partial) => return Ok(None),
        Err(_) => return Err(HttpError::Malformed),
    };

    let code = response.code.ok_or(HttpError::Malformed)?;
    let headers = response
        .headers
        .iter()
        .map(|h| {
            (
                h.name.to_owned(),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();

    Ok(Some((
        ResponseHead {
            status: code,
            headers,
        },
        status,
    )))
}

/// Determine how the body following `head` is framed, applying the
/// known-empty-body exceptions (204, 304, or an explicit
/// `Content-Length: 0`) when length information is otherwise absent.
pub fn body_mode(head: &ResponseHead) -> Result<BodyMode, HttpError> {
    if head.is_chunked() {
        return Ok(BodyMode::Chunked);
    }
    if let Some(len) = head.content_length() {
        return Ok(BodyMode::Fixed(len));
    }
    if matches!(head.status, 204 | 304) {
        return Ok(BodyMode::Fixed(0));
    }
    Err(HttpError::FormatError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_head_returns_none() {
        let buf = b"HTTP/1.1 200 OK\r\nContent-Le";
        assert!(parse_head(buf).unwrap().is_none());
    }

    #[test]
    fn parses_status_and_headers() {
        let buf = b"HTTP/1.1 200 OK\r\nContent-Length: 13\r\nContent-Type: application/json\r\n\r\nbody follows";
        let (head, consumed) = parse_head(buf).unwrap().unwrap();
        assert_eq!(head.status, 200);
        assert_eq!(head.content_length(), Some(13));
        assert_eq!(&buf[consumed..consumed + 13], b"body follows");
    }

    #[test]
    fn detects_chunked_transfer_encoding() {
        let buf = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n";
        let (head, _) = parse_head(buf).unwrap().unwrap();
        assert!(head.is_chunked());
        assert_eq!(body_mode(&head).unwrap(), BodyMode::Chunked);
    }

    #[test]
    fn detects_gzip_content_encoding() {
        let buf = b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\nContent-Encoding: gzip\r\n\r\n";
        let (head, _) = parse_head(buf).unwrap().unwrap();
        assert!(head.is_gzip());
    }

    #[test]
    fn missing_length_on_204_is_known_empty() {
        let buf = b"HTTP/1.1 204 No Content\r\n\r\n";
        let (head, _) = parse_head(buf).unwrap().unwrap();
        assert_eq!(body_mode(&head).unwrap(), BodyMode::Fixed(0));
    }

    #[test]
    fn missing_length_on_200_is_format_error() {
        let buf = b"HTTP/1.1 200 OK\r\n\r\n";
        let (head, _) = parse_head(buf).unwrap().unwrap();
        assert_eq!(body_mode(&head), Err(HttpError::FormatError));
    }
}
