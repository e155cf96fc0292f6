//! Subscribe v2 (`/v2/subscribe/<sub>/<chans>/0?tt=<tt>&tr=<r>&...`,
//! spec §4.5 / §6).

use pn_protocol::subscribe_v2::{self, MessageIter};
use pn_protocol::{Cursor, Outcome, OwnedMessage};

use crate::config::PubNubConfig;
use crate::fsm::Request;
use crate::sign::QueryBuilder;

pub fn build_request(
    config: &PubNubConfig,
    channels: &[String],
    channel_groups: &[String],
    cursor: &Cursor,
    now_unix: i64,
) -> Request {
    let chans = if channels.is_empty() {
        ",".to_owned()
    } else {
        channels.join(",")
    };
    let path = format!(
        "/v2/subscribe/{sub_key}/{chans}/0",
        sub_key = config.keys.subscribe_key,
        chans = crate::sign::percent_encode(&chans),
    );

    let mut query = QueryBuilder::new(config).push("tt", cursor.timetoken.clone());
    if !cursor.is_initial() {
        query = query.push("tr", cursor.region.to_string());
    }
    if !channel_groups.is_empty() {
        query = query.push("channel-group", channel_groups.join(","));
    }

    super::build_request(config, "GET", path, query, None, now_unix)
}

/// Parse a subscribe-v2 response: decode the envelope, advance
/// `cursor`, and collect every message into an owned vector (owned
/// rather than borrowed, since the caller gets this back after the
/// context's response buffer has already been dropped — see spec §3's
/// "Message" borrowing note, and `pn_protocol::message::RawMessage` vs.
/// `OwnedMessage`).
pub fn parse_response(body: &[u8], cursor: &mut Cursor) -> Result<Vec<OwnedMessage>, Outcome> {
    let envelope = subscribe_v2::decode_envelope(body, cursor)?;
    let mut messages = Vec::new();
    for msg in MessageIter::new(body, envelope.messages, cursor.region) {
        messages.push(msg?.to_owned_message(body));
    }
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Keyset;

    #[test]
    fn first_subscribe_sends_only_tt() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let cursor = Cursor::default();
        let req = build_request(&cfg, &["chan".to_owned()], &[], &cursor, 0);
        assert!(req.path_and_query.contains("tt=0"));
        assert!(!req.path_and_query.contains("tr="));
    }

    #[test]
    fn subsequent_subscribe_sends_tt_and_region() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let cursor = Cursor {
            timetoken: "15000000000000000".to_owned(),
            region: 4,
        };
        let req = build_request(&cfg, &["chan".to_owned()], &[], &cursor, 0);
        assert!(req.path_and_query.contains("tt=15000000000000000"));
        assert!(req.path_and_query.contains("tr=4"));
    }

    #[test]
    fn parses_messages_and_advances_cursor() {
        let body = br#"{"t":{"t":"15000000000000001","r":2},"m":[{"d":"hi","c":"chan","p":{"t":"15000000000000001"}}],"pad":"xx"}"#;
        let mut cursor = Cursor::default();
        let messages = parse_response(body, &mut cursor).unwrap();
        assert_eq!(cursor.timetoken, "15000000000000001");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].channel, "chan");
    }
}
