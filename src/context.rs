//! The context: a long-lived client object that drives one transaction
//! at a time (spec §3's central entity).
//!
//! Unlike the original C core, a single fixed byte buffer doesn't carry
//! request and response through a hand-rolled state machine here —
//! `tokio`'s async/await already owns the suspend-between-states job
//! that the C FSM modeled explicitly (see `DESIGN.md`, "Sync vs callback
//! duality"). What the context still owns exactly as specified: the
//! `ptr + unread_len + left == capacity` buffer-capacity invariant (so
//! an oversized request is still rejected before any I/O), the
//! subscribe cursor, the one-transaction-at-a-time guarantee, and
//! cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Notify, Semaphore};

use pn_protocol::Cursor;

use crate::buffer::TxRxBuffer;
use crate::config::PubNubConfig;
use crate::error::ClientError;
use crate::heartbeat::HeartbeatState;
use pn_transport::TlsConfig;

/// Cooperative cancellation handle shared between a context and
/// whichever transaction is currently running on it. `cancel()` is safe
/// from any thread and idempotent (spec §5).
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelHandle {
    fn new() -> Self {
        CancelHandle {
            flag: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel()` has been called. Race this against the
    /// in-flight I/O future with `tokio::select!`.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.notify.notified().await;
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// A long-lived PubNub context. Owns identity, connection configuration,
/// the subscribe cursor, and the auto-heartbeat ("thumper") registry for
/// one logical client.
pub struct Context {
    pub config: PubNubConfig,
    pub(crate) tls: Option<TlsConfig>,
    pub(crate) buffer: TxRxBuffer,
    pub cursor: Cursor,
    pub(crate) heartbeat: HeartbeatState,
    /// Bounds the context to one active transaction at a time (invariant
    /// #1 in spec §8): a second operation call while one is in flight
    /// returns `ClientError::InProgress` without touching any state.
    inflight: Semaphore,
    cancel: CancelHandle,
}

impl Context {
    pub fn new(config: PubNubConfig) -> Self {
        let tls = if config.use_tls {
            let mut builder = TlsConfig::builder().reuse_tls_session(config.reuse_tls_session);
            if config.use_system_certs {
                builder = builder.with_system_certs().unwrap_or_else(|_| TlsConfig::builder());
            }
            if let Some(pem) = &config.user_pem {
                if let Ok(b) = builder.with_pem(pem) {
                    builder = b;
                }
            }
            Some(builder.build())
        } else {
            None
        };

        Context {
            buffer: TxRxBuffer::new(config.buffer_len),
            tls,
            cursor: Cursor::default(),
            heartbeat: HeartbeatState::default(),
            inflight: Semaphore::new(1),
            cancel: CancelHandle::new(),
            config,
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Cancel whatever transaction is currently in flight on this
    /// context. Safe to call even if nothing is running.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub(crate) fn check_request_fits(&self, len: usize) -> Result<(), ClientError> {
        self.buffer.check_fits(len)
    }

    /// Acquire the one-transaction-at-a-time permit for the duration of
    /// a transaction. Returns `InProgress` immediately rather than
    /// queuing, matching spec invariant #1.
    pub(crate) fn begin_transaction(&self) -> Result<tokio::sync::SemaphorePermit<'_>, ClientError> {
        self.cancel.reset();
        self.inflight.try_acquire().map_err(|_| ClientError::InProgress)
    }
}
