//! Incremental chunked transfer-encoding decoder (RFC 7230 §4.1). Trailer
//! headers are read and discarded; nothing downstream needs them.

use crate::error::HttpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Size,
    Data(usize),
    DataCrlf,
    Trailer,
    Done,
}

pub struct ChunkedDecoder {
    buf: Vec<u8>,
    state: State,
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        ChunkedDecoder {
            buf: Vec::new(),
            state: State::Size,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Feed more raw body bytes, appending decoded data to `out`.
    /// Returns `Ok(true)` once the terminating chunk and trailer have
    /// been consumed, `Ok(false)` if more input is needed.
    pub fn feed(&mut self, input: &[u8], out: &mut Vec<u8>, max_len: usize) -> Result<bool, HttpError> {
        self.buf.extend_from_slice(input);
        loop {
            match self.state {
                State::Done => return Ok(true),
                State::Size => {
                    let Some(pos) = find_crlf(&self.buf) else {
                        return Ok(false);
                    };
                    let line = &self.buf[..pos];
                    let size_field = match line.iter().position(|&b| b == b';') {
                        Some(semi) => &line[..semi],
                        None => line,
                    };
                    let size_str = std::str::from_utf8(size_field).map_err(|_| HttpError::ChunkedFraming)?;
                    let size =
                        usize::from_str_radix(size_str.trim(), 16).map_err(|_| HttpError::ChunkedFraming)?;
                    self.buf.drain(..pos + 2);
                    self.state = if size == 0 { State::Trailer } else { State::Data(size) };
                }
                State::Data(remaining) => {
                    if self.buf.is_empty() {
                        return Ok(false);
                    }
                    let take = remaining.min(self.buf.len());
                    if out.len() + take > max_len {
                        return Err(HttpError::ReplyTooBig);
                    }
                    out.extend_from_slice(&self.buf[..take]);
                    self.buf.drain(..take);
                    let left = remaining - take;
                    if left > 0 {
                        self.state = State::Data(left);
                        return Ok(false);
                    }
                    self.state = State::DataCrlf;
                }
                State::DataCrlf => {
                    if self.buf.len() < 2 {
                        return Ok(false);
                    }
                    if &self.buf[..2] != b"\r\n" {
                        return Err(HttpError::ChunkedFraming);
                    }
                    self.buf.drain(..2);
                    self.state = State::Size;
                }
                State::Trailer => {
                    let Some(pos) = find_crlf(&self.buf) else {
                        return Ok(false);
                    };
                    if pos == 0 {
                        self.buf.drain(..2);
                        self.state = State::Done;
                        return Ok(true);
                    }
                    self.buf.drain(..pos + 2);
                }
            }
        }
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_chunk_in_one_feed() {
        let mut decoder = ChunkedDecoder::new();
        let mut out = Vec::new();
        let done = decoder
            .feed(b"5\r\nhello\r\n0\r\n\r\n", &mut out, 1024)
            .unwrap();
        assert!(done);
        assert_eq!(out, b"hello");
    }

    #[test]
    fn decodes_multiple_chunks() {
        let mut decoder = ChunkedDecoder::new();
        let mut out = Vec::new();
        let done = decoder
            .feed(b"4\r\nwiki\r\n5\r\npedia\r\n0\r\n\r\n", &mut out, 1024)
            .unwrap();
        assert!(done);
        assert_eq!(out, b"wikipedia");
    }

    #[test]
    fn handles_chunk_extensions() {
        let mut decoder = ChunkedDecoder::new();
        let mut out = Vec::new();
        let done = decoder
            .feed(b"5;ext=1\r\nhello\r\n0\r\n\r\n", &mut out, 1024)
            .unwrap();
        assert!(done);
        assert_eq!(out, b"hello");
    }

    #[test]
    fn handles_byte_by_byte_feeding() {
        let mut decoder = ChunkedDecoder::new();
        let mut out = Vec::new();
        let whole = b"5\r\nhello\r\n0\r\n\r\n";
        let mut done = false;
        for byte in whole {
            done = decoder.feed(&[*byte], &mut out, 1024).unwrap();
        }
        assert!(done);
        assert_eq!(out, b"hello");
    }

    #[test]
    fn discards_trailer_headers() {
        let mut decoder = ChunkedDecoder::new();
        let mut out = Vec::new();
        let done = decoder
            .feed(b"3\r\nfoo\r\n0\r\nX-Trailer: value\r\n\r\n", &mut out, 1024)
            .unwrap();
        assert!(done);
        assert_eq!(out, b"foo");
    }

    #[test]
    fn rejects_non_hex_chunk_size() {
        let mut decoder = ChunkedDecoder::new();
        let mut out = Vec::new();
        assert_eq!(
            decoder.feed(b"zz\r\ndata\r\n", &mut out, 1024),
            Err(HttpError::ChunkedFraming)
        );
    }

    #[test]
    fn rejects_oversized_body() {
        let mut decoder = ChunkedDecoder::new();
        let mut out = Vec::new();
        assert_eq!(
            decoder.feed(b"5\r\nhello\r\n0\r\n\r\n", &mut out, 3),
            Err(HttpError::ReplyTooBig)
        );
    }
}
