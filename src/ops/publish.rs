//! Publish (`/publish/<pub>/<sub>/0/<chan>/0/<msg>`, spec §6).

use pn_protocol::Outcome;

use crate::config::PubNubConfig;
use crate::fsm::Request;
use crate::sign::QueryBuilder;

pub struct PublishResult {
    pub timetoken: String,
}

/// Build a publish request. `message` is the already-JSON-encoded
/// payload (the caller is responsible for `serde_json::to_string` on
/// whatever value it wants to publish); when `ciphertext` is `Some`, it
/// replaces `message` as the published body — the encrypted-envelope
/// base64 string produced by `pn_crypto::encrypt_message`.
pub fn build_request(
    config: &PubNubConfig,
    channel: &str,
    message: &str,
    ciphertext: Option<&str>,
    now_unix: i64,
) -> Request {
    let payload = ciphertext.map(|c| format!("\"{c}\"")).unwrap_or_else(|| message.to_owned());
    let encoded_msg = crate::sign::percent_encode(&payload);
    let path = format!(
        "/publish/{pub_key}/{sub_key}/0/{chan}/0/{msg}",
        pub_key = config.keys.publish_key,
        sub_key = config.keys.subscribe_key,
        chan = crate::sign::percent_encode(channel),
        msg = encoded_msg,
    );
    let query = QueryBuilder::new(config);
    super::build_request(config, "GET", path, query, None, now_unix)
}

/// Parse a publish response: `[1,"Sent","<timetoken>"]` on success, or
/// `[0,"<error message>","0"]` on failure.
pub fn parse_response(body: &[u8]) -> Result<PublishResult, Outcome> {
    let text = std::str::from_utf8(body).map_err(|_| Outcome::FormatError)?;
    let value: serde_json::Value = serde_json::from_str(text).map_err(|_| Outcome::FormatError)?;
    let array = value.as_array().ok_or(Outcome::FormatError)?;
    let status = array.first().and_then(serde_json::Value::as_i64).ok_or(Outcome::FormatError)?;
    if status != 1 {
        return Err(Outcome::PublishFailed);
    }
    let timetoken = array
        .get(2)
        .and_then(serde_json::Value::as_str)
        .ok_or(Outcome::FormatError)?
        .to_owned();
    Ok(PublishResult { timetoken })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Keyset;

    #[test]
    fn builds_publish_path_with_percent_encoded_message() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let req = build_request(&cfg, "chan", "\"hi\"", None, 0);
        assert!(req.path_and_query.starts_with("/publish/demo/demo/0/chan/0/"));
    }

    #[test]
    fn ciphertext_replaces_plaintext_payload() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let req = build_request(&cfg, "chan", "\"hi\"", Some("abcd=="), 0);
        assert!(req.path_and_query.contains("abcd"));
    }

    #[test]
    fn parses_successful_response() {
        let result = parse_response(br#"[1,"Sent","15000000000000000"]"#).unwrap();
        assert_eq!(result.timetoken, "15000000000000000");
    }

    #[test]
    fn parses_failed_response() {
        assert_eq!(
            parse_response(br#"[0,"Invalid Key","0"]"#),
            Err(Outcome::PublishFailed)
        );
    }
}
