//! Decoder for the subscribe-v2 response envelope:
//! `{ "t": { "t": "<timetoken>", "r": <region> }, "m": [ <msg>, ... ] }`.
//!
//! Per spec, this is a lazy, hand-rolled scanner — not a schema-validated
//! JSON parser. The envelope's cursor is decoded eagerly; individual
//! messages are decoded one at a time by [`MessageIter`], mirroring the
//! original `pbcc_get_msg_v2` "advance past the consumed object" shape.

use crate::cursor::{Cursor, TIMETOKEN_MAXLEN};
use crate::json_scan::{self, Span};
use crate::message::{MessageType, RawMessage};
use crate::outcome::Outcome;

/// Minimum plausible length of a subscribe-v2 envelope (`{"t":{"t":"0","r":0},"m":[]}` is 27,
/// but the original core uses 40 as a conservative floor).
pub const MIN_SUBSCRIBE_V2_RESPONSE_LENGTH: usize = 40;

/// The decoded envelope: the new cursor plus the byte span of the `m`
/// array's contents (exclusive of the enclosing brackets).
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    pub cursor_span_consumed: (),
    pub messages: Span,
}

/// Decode the outer envelope: validate shape, short-circuit on
/// access-denied / empty-group statuses, and extract the new cursor.
///
/// On success, returns the envelope and writes the new cursor into
/// `cursor`. Does not parse individual messages.
pub fn decode_envelope(body: &[u8], cursor: &mut Cursor) -> Result<Envelope, Outcome> {
    if body.len() < MIN_SUBSCRIBE_V2_RESPONSE_LENGTH {
        return Err(Outcome::FormatError);
    }
    if body[0] != b'{' || body[body.len() - 1] != b'}' {
        return Err(Outcome::FormatError);
    }

    let whole = Span {
        start: 0,
        end: body.len(),
    };

    if let Some(status) = json_scan::find_field(body, whole, "status") {
        let raw = status.slice(body);
        if raw == b"403" {
            return Err(Outcome::AccessDenied);
        }
        if raw == b"400" {
            return match json_scan::find_field(body, whole, "message") {
                Some(msg)
                    if msg.slice(body)
                        == br#""Channel group or groups result in empty subscription set""# =>
                {
                    Err(Outcome::GroupEmpty)
                }
                _ => Err(Outcome::FormatError),
            };
        }
    }

    let t_obj = json_scan::find_field(body, whole, "t").ok_or(Outcome::SubNoTtError)?;
    let tt_value = json_scan::find_field(body, t_obj, "t").ok_or(Outcome::SubNoTtError)?;
    if !json_scan::is_quoted_string(body, tt_value) {
        return Err(Outcome::SubTtFormatError);
    }
    let tt_span = json_scan::unquote(tt_value);
    if tt_span.len() >= TIMETOKEN_MAXLEN {
        return Err(Outcome::SubTtFormatError);
    }
    let tt = std::str::from_utf8(tt_span.slice(body)).map_err(|_| Outcome::SubTtFormatError)?;

    let region_value = json_scan::find_field(body, t_obj, "r").ok_or(Outcome::SubNoRegError)?;
    let region: i64 = std::str::from_utf8(region_value.slice(body))
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(Outcome::SubNoRegError)?;

    cursor.timetoken = tt.to_owned();
    cursor.region = region;

    let m = json_scan::find_field(body, whole, "m").ok_or(Outcome::FormatError)?;
    // `m`'s span includes the enclosing `[` `]`; messages live strictly inside.
    let messages = Span {
        start: m.start + 1,
        end: m.end.saturating_sub(1),
    };

    Ok(Envelope {
        cursor_span_consumed: (),
        messages,
    })
}

/// Lazy iterator over the messages inside an envelope's `m` array,
/// mirroring `pbcc_get_msg_v2`'s "scan from `msg_ofs`, advance past the
/// consumed object" behavior. Yields `None` once `msg_ofs >= msg_end`.
pub struct MessageIter<'a> {
    buf: &'a [u8],
    ofs: usize,
    end: usize,
    region: i64,
}

impl<'a> MessageIter<'a> {
    pub fn new(buf: &'a [u8], messages: Span, region: i64) -> Self {
        MessageIter {
            buf,
            ofs: messages.start,
            end: messages.end,
            region,
        }
    }
}

impl<'a> Iterator for MessageIter<'a> {
    type Item = Result<RawMessage, Outcome>;

    fn next(&mut self) -> Option<Self::Item> {
        // Skip separators/whitespace between array elements.
        while self.ofs < self.end
            && matches!(self.buf[self.ofs], b',' | b' ' | b'\t' | b'\r' | b'\n')
        {
            self.ofs += 1;
        }
        if self.ofs >= self.end {
            return None;
        }
        if self.buf[self.ofs] != b'{' {
            return Some(Err(Outcome::FormatError));
        }
        let obj_end = match json_scan::find_value_end(self.buf, self.ofs) {
            Some(e) => e,
            None => return Some(Err(Outcome::FormatError)),
        };
        let obj = Span {
            start: self.ofs,
            end: obj_end,
        };
        self.ofs = obj_end;

        Some(decode_one_message(self.buf, obj, self.region))
    }
}

fn decode_one_message(buf: &[u8], obj: Span, region: i64) -> Result<RawMessage, Outcome> {
    let payload = json_scan::find_field(buf, obj, "d").ok_or(Outcome::FormatError)?;

    let channel = json_scan::find_field(buf, obj, "c").ok_or(Outcome::FormatError)?;
    if !json_scan::is_quoted_string(buf, channel) {
        return Err(Outcome::FormatError);
    }
    let channel = json_scan::unquote(channel);

    let message_type = json_scan::find_field(buf, obj, "e")
        .map(|v| MessageType::from_code(v.slice(buf)))
        .unwrap_or(MessageType::Published);

    let p = json_scan::find_field(buf, obj, "p").ok_or(Outcome::FormatError)?;
    let tt_value = json_scan::find_field(buf, p, "t").ok_or(Outcome::FormatError)?;
    if !json_scan::is_quoted_string(buf, tt_value) {
        return Err(Outcome::FormatError);
    }
    let publish_timetoken = json_scan::unquote(tt_value);

    let match_or_group = json_scan::find_field(buf, obj, "b");
    let metadata = json_scan::find_field(buf, obj, "u");
    let publisher = json_scan::find_field(buf, obj, "i").map(json_scan::unquote);
    let flags = json_scan::find_field(buf, obj, "f")
        .and_then(|v| std::str::from_utf8(v.slice(buf)).ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    Ok(RawMessage {
        payload,
        channel,
        match_or_group,
        publish_timetoken,
        publisher,
        metadata,
        message_type,
        flags,
        region,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(m: &str, tt: &str, r: i64) -> String {
        let body = format!(r#"{{"t":{{"t":"{tt}","r":{r}}},"m":[{m}]}}"#);
        if body.len() >= MIN_SUBSCRIBE_V2_RESPONSE_LENGTH {
            return body;
        }
        let pad = "x".repeat(MIN_SUBSCRIBE_V2_RESPONSE_LENGTH - body.len());
        format!(
            r#"{{"t":{{"t":"{tt}","r":{r}}},"m":[{m}],"pad":"{pad}"}}"#
        )
    }

    #[test]
    fn decodes_empty_message_list_and_bootstraps_cursor() {
        let body = envelope("", "15000000000000000", 1);
        let mut cursor = Cursor::default();
        let env = decode_envelope(body.as_bytes(), &mut cursor).unwrap();
        assert_eq!(cursor.timetoken, "15000000000000000");
        assert_eq!(cursor.region, 1);
        let msgs: Vec<_> = MessageIter::new(body.as_bytes(), env.messages, cursor.region).collect();
        assert!(msgs.is_empty());
    }

    #[test]
    fn decodes_one_published_message() {
        let m = r#"{"d":"hi","c":"chan","p":{"t":"15000000000000001"}}"#;
        let body = envelope(m, "15000000000000001", 2);
        let mut cursor = Cursor::default();
        let env = decode_envelope(body.as_bytes(), &mut cursor).unwrap();
        let msgs: Vec<_> = MessageIter::new(body.as_bytes(), env.messages, cursor.region)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].channel_str(body.as_bytes()), "chan");
        assert_eq!(msgs[0].payload_str(body.as_bytes()), b"\"hi\"");
        assert_eq!(msgs[0].message_type, MessageType::Published);
    }

    #[test]
    fn decodes_multiple_messages_in_server_order() {
        let m = r#"{"d":1,"c":"a","p":{"t":"1"}},{"d":2,"c":"b","p":{"t":"2"}}"#;
        let body = envelope(m, "2", 0);
        let mut cursor = Cursor::default();
        let env = decode_envelope(body.as_bytes(), &mut cursor).unwrap();
        let msgs: Vec<_> = MessageIter::new(body.as_bytes(), env.messages, cursor.region)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].channel_str(body.as_bytes()), "a");
        assert_eq!(msgs[1].channel_str(body.as_bytes()), "b");
    }

    #[test]
    fn status_403_is_access_denied() {
        let body = r#"{"status":403,"message":"Forbidden","t":{"t":"1","r":0},"m":[],"pad":"xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx"}"#.to_owned();
        let mut cursor = Cursor::default();
        assert_eq!(
            decode_envelope(body.as_bytes(), &mut cursor),
            Err(Outcome::AccessDenied)
        );
    }

    #[test]
    fn status_400_empty_group_message_is_group_empty() {
        let body = r#"{"status":400,"message":"Channel group or groups result in empty subscription set","t":{"t":"1","r":0}}"#;
        let mut cursor = Cursor::default();
        assert_eq!(
            decode_envelope(body.as_bytes(), &mut cursor),
            Err(Outcome::GroupEmpty)
        );
    }

    #[test]
    fn too_short_body_is_format_error() {
        let mut cursor = Cursor::default();
        assert_eq!(
            decode_envelope(b"{}", &mut cursor),
            Err(Outcome::FormatError)
        );
    }

    #[test]
    fn missing_brace_bounds_is_format_error() {
        let body = r#"{"t":{"t":"1","r":0},"m":[]                        "#.to_owned();
        let mut cursor = Cursor::default();
        assert_eq!(
            decode_envelope(body.as_bytes(), &mut cursor),
            Err(Outcome::FormatError)
        );
    }
}
