use crate::json_scan::Span;
use serde::{Deserialize, Serialize};

/// The `e` discriminator in a subscribe-v2 message object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    Published,
    Signal,
    Objects,
    Action,
    Files,
}

impl MessageType {
    pub fn from_code(code: &[u8]) -> MessageType {
        match code {
            b"1" => MessageType::Signal,
            b"2" => MessageType::Objects,
            b"3" => MessageType::Action,
            b"4" => MessageType::Files,
            _ => MessageType::Published,
        }
    }
}

/// A message extracted from a subscribe-v2 response.
///
/// Field spans are byte ranges into the context's response buffer — they
/// are invalidated by the next transaction on that context, which is why
/// this type borrows rather than owns.
#[derive(Debug, Clone, Copy)]
pub struct RawMessage {
    pub payload: Span,
    pub channel: Span,
    pub match_or_group: Option<Span>,
    pub publish_timetoken: Span,
    pub publisher: Option<Span>,
    pub metadata: Option<Span>,
    pub message_type: MessageType,
    pub flags: i64,
    pub region: i64,
}

impl RawMessage {
    pub fn payload_str<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        self.payload.slice(buf)
    }

    pub fn channel_str<'a>(&self, buf: &'a [u8]) -> &'a str {
        std::str::from_utf8(self.channel.slice(buf)).unwrap_or_default()
    }
}

/// An owned copy of [`RawMessage`], for callers that need the message to
/// outlive the next transaction on the originating context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedMessage {
    pub payload: String,
    pub channel: String,
    pub subscription_match_or_group: Option<String>,
    pub publish_timetoken: String,
    pub publisher_id: Option<String>,
    pub metadata: Option<String>,
    pub message_type: OwnedMessageType,
    pub flags: i64,
    pub region: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnedMessageType {
    Published,
    Signal,
    Objects,
    Action,
    Files,
}

impl From<MessageType> for OwnedMessageType {
    fn from(t: MessageType) -> Self {
        match t {
            MessageType::Published => OwnedMessageType::Published,
            MessageType::Signal => OwnedMessageType::Signal,
            MessageType::Objects => OwnedMessageType::Objects,
            MessageType::Action => OwnedMessageType::Action,
            MessageType::Files => OwnedMessageType::Files,
        }
    }
}

impl RawMessage {
    pub fn to_owned_message(&self, buf: &[u8]) -> OwnedMessage {
        let s = |span: Span| String::from_utf8_lossy(span.slice(buf)).into_owned();
        OwnedMessage {
            payload: s(self.payload),
            channel: s(self.channel),
            subscription_match_or_group: self.match_or_group.map(s),
            publish_timetoken: s(self.publish_timetoken),
            publisher_id: self.publisher.map(s),
            metadata: self.metadata.map(s),
            message_type: self.message_type.into(),
            flags: self.flags,
            region: self.region,
        }
    }
}
