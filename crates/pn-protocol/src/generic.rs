//! Generic (non-subscribe-v2) response parsing: every other transaction
//! kind expects a JSON object and extracts a top-level `data` field on
//! success or `error`/`error_message` on failure.

use crate::json_scan::{self, Span};
use crate::outcome::Outcome;

/// Outcome of extracting the generic success/error envelope from a
/// transaction's JSON body.
pub enum GenericReply {
    Data(Span),
    Error(Span),
}

/// Extract `data` or `error`/`error_message` from a parsed JSON object
/// response. The absence of both is a format error, per spec §4.1.
pub fn extract(body: &[u8]) -> Result<GenericReply, Outcome> {
    if body.is_empty() || body[0] != b'{' || body[body.len() - 1] != b'}' {
        return Err(Outcome::FormatError);
    }
    let whole = Span {
        start: 0,
        end: body.len(),
    };
    if let Some(data) = json_scan::find_field(body, whole, "data") {
        return Ok(GenericReply::Data(data));
    }
    if let Some(err) = json_scan::find_field(body, whole, "error") {
        return Ok(GenericReply::Error(err));
    }
    if let Some(err) = json_scan::find_field(body, whole, "error_message") {
        return Ok(GenericReply::Error(err));
    }
    Err(Outcome::FormatError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_data_field() {
        let body = br#"{"data":{"x":1},"status":200}"#;
        match extract(body).unwrap() {
            GenericReply::Data(span) => assert_eq!(span.slice(body), br#"{"x":1}"#),
            GenericReply::Error(_) => panic!("expected data"),
        }
    }

    #[test]
    fn extracts_error_field() {
        let body = br#"{"error":"Forbidden","status":403}"#;
        match extract(body).unwrap() {
            GenericReply::Error(span) => assert_eq!(span.slice(body), br#""Forbidden""#),
            GenericReply::Data(_) => panic!("expected error"),
        }
    }

    #[test]
    fn neither_field_is_format_error() {
        let body = br#"{"status":200}"#;
        assert!(matches!(extract(body), Err(Outcome::FormatError)));
    }
}
