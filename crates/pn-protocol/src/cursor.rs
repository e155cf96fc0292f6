use serde::{Deserialize, Serialize};

/// Maximum length of a timetoken string the context buffer will hold
/// (matches `PUBNUB_TIMETOKEN_MAXLEN` semantics in the original core).
pub const TIMETOKEN_MAXLEN: usize = 64;

/// A subscribe continuation cursor: an opaque high-precision timestamp
/// string plus an integer region. Created on the first subscribe
/// response, overwritten on every subsequent one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub timetoken: String,
    pub region: i64,
}

impl Default for Cursor {
    /// An empty timetoken initializes to `"0"`; region is omitted (0)
    /// on the first subscribe call.
    fn default() -> Self {
        Cursor {
            timetoken: "0".to_owned(),
            region: 0,
        }
    }
}

impl Cursor {
    /// True for the bootstrap cursor sent on a context's very first
    /// subscribe call (region is not sent on the wire in this case).
    pub fn is_initial(&self) -> bool {
        self.timetoken == "0" && self.region == 0
    }

    /// Validate and adopt a server-returned timetoken. Rejects a
    /// timetoken one byte or more too long for the slot (boundary
    /// property #9 in the spec).
    pub fn set_timetoken(&mut self, tt: &str) -> Result<(), CursorError> {
        if tt.len() >= TIMETOKEN_MAXLEN {
            return Err(CursorError::TooLong);
        }
        self.timetoken = tt.to_owned();
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("timetoken exceeds the {TIMETOKEN_MAXLEN}-byte slot")]
    TooLong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_bootstrap_cursor() {
        let c = Cursor::default();
        assert_eq!(c.timetoken, "0");
        assert_eq!(c.region, 0);
        assert!(c.is_initial());
    }

    #[test]
    fn timetoken_one_byte_short_of_slot_parses() {
        let mut c = Cursor::default();
        let tt = "1".repeat(TIMETOKEN_MAXLEN - 1);
        assert!(c.set_timetoken(&tt).is_ok());
        assert_eq!(c.timetoken.len(), TIMETOKEN_MAXLEN - 1);
    }

    #[test]
    fn timetoken_one_byte_long_rejected() {
        let mut c = Cursor::default();
        let tt = "1".repeat(TIMETOKEN_MAXLEN);
        assert_eq!(c.set_timetoken(&tt), Err(CursorError::TooLong));
    }
}
