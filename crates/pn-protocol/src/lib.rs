//! Wire data model shared between the transaction engine and the
//! transport layer: outcome codes, the subscribe cursor, message types,
//! and the subscribe-v2 / generic response decoders.

pub mod cursor;
pub mod generic;
pub mod json_scan;
pub mod message;
pub mod outcome;
pub mod subscribe_v2;

pub use cursor::Cursor;
pub use message::{MessageType, OwnedMessage, RawMessage};
pub use outcome::Outcome;
