//! A client SDK for a realtime publish/subscribe messaging service.
//!
//! The public entry point is [`client::PubNub`], a long-lived handle that
//! drives one transaction at a time per [`context::Context`] — publish,
//! subscribe, history, presence, message actions, object metadata,
//! grant/revoke token, and time. See `SPEC_FULL.md` for the module map.

pub mod buffer;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod fsm;
pub mod heartbeat;
pub mod ops;
pub mod scheduler;
pub mod sign;

pub use client::PubNub;
pub use config::{Keyset, PubNubConfig};
pub use error::ClientError;

pub use pn_protocol::{Cursor, MessageType, Outcome, OwnedMessage};
