//! The single fixed-size buffer a context uses to build a request URL
//! and body before it's ever written to the wire. It exists so an
//! oversized request (a channel name long enough to blow past the
//! configured limit) is rejected as [`Outcome::TxBuffTooSmall`] before
//! any network I/O runs, not partway through a write.

use crate::error::ClientError;
use pn_protocol::Outcome;

pub const DEFAULT_BUFFER_LEN: usize = 32 * 1024;

/// Tracks the `ptr + unread_len + left == capacity` invariant from the
/// context data model. `ptr` and `unread_len` aren't meaningfully used by
/// this port's request/response path (each transaction owns its own
/// heap-allocated request and response buffers instead of reusing one
/// fixed region byte-for-byte) but the capacity check they describe —
/// reject an over-long request before any I/O — is enforced here.
pub struct TxRxBuffer {
    capacity: usize,
    ptr: usize,
    unread_len: usize,
}

impl TxRxBuffer {
    pub fn new(capacity: usize) -> Self {
        TxRxBuffer {
            capacity,
            ptr: 0,
            unread_len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn left(&self) -> usize {
        self.capacity - self.ptr - self.unread_len
    }

    fn assert_invariant(&self) {
        debug_assert_eq!(self.ptr + self.unread_len + self.left(), self.capacity);
    }

    /// Check that `len` bytes (a request line, or a full response body)
    /// fit within the buffer's capacity.
    pub fn check_fits(&self, len: usize) -> Result<(), ClientError> {
        if len > self.capacity {
            return Err(ClientError::Outcome(Outcome::TxBuffTooSmall));
        }
        Ok(())
    }

    /// Record that `len` bytes are now buffered, for invariant bookkeeping.
    pub fn fill(&mut self, len: usize) {
        self.unread_len = len;
        self.ptr = 0;
        self.assert_invariant();
    }

    pub fn clear(&mut self) {
        self.ptr = 0;
        self.unread_len = 0;
        self.assert_invariant();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_buffer_satisfies_invariant() {
        let buf = TxRxBuffer::new(DEFAULT_BUFFER_LEN);
        assert_eq!(buf.left(), DEFAULT_BUFFER_LEN);
    }

    #[test]
    fn oversized_request_is_rejected_before_any_io() {
        let buf = TxRxBuffer::new(1024);
        let oversized = vec![b'a'; 2048];
        assert!(matches!(
            buf.check_fits(oversized.len()),
            Err(ClientError::Outcome(Outcome::TxBuffTooSmall))
        ));
    }

    #[test]
    fn fill_then_clear_restores_invariant() {
        let mut buf = TxRxBuffer::new(DEFAULT_BUFFER_LEN);
        buf.fill(512);
        assert_eq!(buf.left(), DEFAULT_BUFFER_LEN - 512);
        buf.clear();
        assert_eq!(buf.left(), DEFAULT_BUFFER_LEN);
    }
}
