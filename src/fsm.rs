//! The per-transaction state machine (spec §4.1): drives one request
//! from idle through DNS resolution, connect, optional TLS, send,
//! receive, and JSON parse to an [`Outcome`].
//!
//! `TxState` enumerates the named states from the spec for tracing and
//! for the cancellation-from-every-state property test (§8 item 11).
//! The actual suspension between states is `tokio`'s, not a hand-rolled
//! poll loop — see `context.rs`'s module doc and `DESIGN.md`.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, trace, warn};

use pn_http::head::{self, BodyMode};
use pn_http::{ChunkedDecoder, HttpError};
use pn_protocol::Outcome;

use crate::context::{CancelHandle, Context};
use crate::error::ClientError;

/// Named states from spec §4.1, recorded for tracing/testing. `Context`
/// does not literally block in any of these: each is entered and left
/// within one `.await` point of `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Idle,
    ResolvStart,
    ConnectStart,
    TlsHandshake,
    SendRequest,
    RcvStatusLine,
    RcvHeaders,
    RcvBody,
    ParseResponse,
    WaitCancel,
}

/// An outgoing request, fully formatted (request line, headers, and
/// optional body) by one of the `ops` modules.
pub struct Request {
    pub method: &'static str,
    pub host: String,
    pub port: u16,
    pub path_and_query: String,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Serialize the request line + headers + body into the bytes that
    /// go over the wire. Also the point at which the context's buffer
    /// capacity is checked (`TX_BUFF_TOO_SMALL` before any I/O).
    fn serialize(&self, ctx: &Context) -> Result<Vec<u8>, ClientError> {
        let body_len = self.body.as_ref().map_or(0, Vec::len);
        let mut head = format!(
            "{method} {path} HTTP/1.1\r\nHost: {host}\r\nAccept-Encoding: {enc}\r\nConnection: close\r\n",
            method = self.method,
            path = self.path_and_query,
            host = self.host,
            enc = if ctx.config.compression { "gzip" } else { "identity" },
        );
        if body_len > 0 {
            head.push_str("Content-Type: application/json\r\n");
            head.push_str(&format!("Content-Length: {body_len}\r\n"));
        }
        head.push_str("\r\n");

        ctx.check_request_fits(head.len() + body_len)?;

        let mut out = head.into_bytes();
        if let Some(body) = &self.body {
            out.extend_from_slice(body);
        }
        Ok(out)
    }
}

/// The result of a completed transaction: the outcome plus, on success,
/// the raw (already gzip-inflated) response body for the caller's
/// `ops::*::parse_response` to interpret.
pub struct TransactionResult {
    pub outcome: Outcome,
    pub body: Vec<u8>,
}

/// Drive one transaction on `ctx` to completion.
pub async fn run(ctx: &mut Context, request: Request) -> TransactionResult {
    let cancel = ctx.cancel_handle();
    let timeout = ctx.config.transaction_timeout;

    match tokio::time::timeout(timeout, drive(ctx, request, &cancel)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(state = ?TxState::Idle, "transaction timed out");
            TransactionResult {
                outcome: Outcome::Timeout,
                body: Vec::new(),
            }
        }
    }
}

async fn drive(ctx: &mut Context, request: Request, cancel: &CancelHandle) -> TransactionResult {
    macro_rules! race_cancel {
        ($state:expr, $fut:expr) => {{
            trace!(state = ?$state, "fsm transition");
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return TransactionResult { outcome: Outcome::Cancelled, body: Vec::new() };
                }
                result = $fut => result,
            }
        }};
    }

    let bytes = match request.serialize(ctx) {
        Ok(b) => b,
        Err(_) => {
            return TransactionResult {
                outcome: Outcome::TxBuffTooSmall,
                body: Vec::new(),
            };
        }
    };

    debug!(host = %request.host, path = %request.path_and_query, "transaction starting");

    let stream = race_cancel!(
        TxState::ConnectStart,
        pn_transport::connect(
            &request.host,
            request.port,
            ctx.tls.as_ref(),
            ctx.config.fallback_to_cleartext,
        )
    );
    let mut stream = match stream {
        Ok(s) => s,
        Err(err) => {
            warn!(error = %err, "connect failed");
            return TransactionResult {
                outcome: ClientError::from(err).outcome(),
                body: Vec::new(),
            };
        }
    };

    let send = race_cancel!(TxState::SendRequest, stream.write_all(&bytes));
    if let Err(err) = send {
        return TransactionResult {
            outcome: ClientError::from(err).outcome(),
            body: Vec::new(),
        };
    }
    let _ = race_cancel!(TxState::SendRequest, stream.flush());

    let mut recv_buf: Vec<u8> = Vec::with_capacity(4096);
    let head = loop {
        match head::parse_head(&recv_buf) {
            Ok(Some(parsed)) => break parsed,
            Ok(None) => {
                let mut chunk = [0u8; 4096];
                let n = race_cancel!(TxState::RcvHeaders, stream.read(&mut chunk));
                match n {
                    Ok(0) => {
                        return TransactionResult {
                            outcome: Outcome::IoError,
                            body: Vec::new(),
                        };
                    }
                    Ok(n) => {
                        if recv_buf.len() + n > ctx.config.reply_maxlen {
                            return TransactionResult {
                                outcome: Outcome::ReplyTooBig,
                                body: Vec::new(),
                            };
                        }
                        recv_buf.extend_from_slice(&chunk[..n]);
                    }
                    Err(_) => {
                        return TransactionResult {
                            outcome: Outcome::IoError,
                            body: Vec::new(),
                        };
                    }
                }
            }
            Err(_) => {
                return TransactionResult {
                    outcome: Outcome::FormatError,
                    body: Vec::new(),
                };
            }
        }
    };
    let (response_head, consumed) = head;
    trace!(status = response_head.status, state = ?TxState::RcvHeaders, "status line and headers received");

    let mut remaining = recv_buf.split_off(consumed);
    let body_mode = match head::body_mode(&response_head) {
        Ok(mode) => mode,
        Err(HttpError::FormatError) => {
            return TransactionResult {
                outcome: Outcome::FormatError,
                body: Vec::new(),
            };
        }
        Err(_) => {
            return TransactionResult {
                outcome: Outcome::HttpError,
                body: Vec::new(),
            };
        }
    };

    let raw_body = match body_mode {
        BodyMode::Fixed(len) => {
            while remaining.len() < len {
                if len > ctx.config.reply_maxlen {
                    return TransactionResult {
                        outcome: Outcome::ReplyTooBig,
                        body: Vec::new(),
                    };
                }
                let mut chunk = [0u8; 4096];
                let n = race_cancel!(TxState::RcvBody, stream.read(&mut chunk));
                match n {
                    Ok(0) => break,
                    Ok(n) => remaining.extend_from_slice(&chunk[..n]),
                    Err(_) => {
                        return TransactionResult {
                            outcome: Outcome::IoError,
                            body: Vec::new(),
                        };
                    }
                }
            }
            remaining.truncate(len);
            remaining
        }
        BodyMode::Chunked => {
            let mut decoder = ChunkedDecoder::new();
            let mut out = Vec::new();
            let mut done = match decoder.feed(&remaining, &mut out, ctx.config.reply_maxlen) {
                Ok(d) => d,
                Err(err) => {
                    return TransactionResult {
                        outcome: ClientError::from(err).outcome(),
                        body: Vec::new(),
                    };
                }
            };
            while !done {
                let mut chunk = [0u8; 4096];
                let n = race_cancel!(TxState::RcvBody, stream.read(&mut chunk));
                match n {
                    Ok(0) => break,
                    Ok(n) => {
                        done = match decoder.feed(&chunk[..n], &mut out, ctx.config.reply_maxlen) {
                            Ok(d) => d,
                            Err(err) => {
                                return TransactionResult {
                                    outcome: ClientError::from(err).outcome(),
                                    body: Vec::new(),
                                };
                            }
                        };
                    }
                    Err(_) => {
                        return TransactionResult {
                            outcome: Outcome::IoError,
                            body: Vec::new(),
                        };
                    }
                }
            }
            out
        }
    };

    let status = response_head.status;
    if status == 403 {
        return TransactionResult {
            outcome: Outcome::AccessDenied,
            body: raw_body,
        };
    }

    let body = if response_head.is_gzip() && ctx.config.compression {
        match pn_http::gzip::inflate(&raw_body, ctx.config.reply_maxlen) {
            Ok(b) => b,
            Err(err) => {
                return TransactionResult {
                    outcome: ClientError::from(err).outcome(),
                    body: Vec::new(),
                };
            }
        }
    } else {
        raw_body
    };

    trace!(state = ?TxState::ParseResponse, len = body.len(), "response body ready for parsing");

    let outcome = if (400..600).contains(&status) && status != 403 {
        Outcome::HttpError
    } else {
        Outcome::Ok
    };

    TransactionResult { outcome, body }
}

/// Helper for tests that want to exercise the wait-for-connect timeout
/// specifically, distinct from the overall transaction timeout.
pub fn wait_for_connect_timeout(ctx: &Context) -> Duration {
    ctx.config.wait_for_connect_timeout
}
