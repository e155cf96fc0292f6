//! Time (`/time/0`, spec §6) — the simplest transaction kind: no
//! request body, no `data`/`error` envelope, just a bare JSON array.

use pn_protocol::Outcome;

use crate::config::PubNubConfig;
use crate::fsm::Request;
use crate::sign::QueryBuilder;

pub fn build_request(config: &PubNubConfig, now_unix: i64) -> Request {
    super::build_request(config, "GET", "/time/0".to_owned(), QueryBuilder::new(config), None, now_unix)
}

pub fn parse_response(body: &[u8]) -> Result<String, Outcome> {
    let text = std::str::from_utf8(body).map_err(|_| Outcome::FormatError)?;
    let value: serde_json::Value = serde_json::from_str(text).map_err(|_| Outcome::FormatError)?;
    value
        .as_array()
        .and_then(|a| a.first())
        .and_then(serde_json::Value::as_i64)
        .map(|tt| tt.to_string())
        .ok_or(Outcome::FormatError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Keyset;

    #[test]
    fn builds_bare_time_path() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let req = build_request(&cfg, 0);
        assert!(req.path_and_query.starts_with("/time/0?"));
    }

    #[test]
    fn parses_timetoken_array() {
        assert_eq!(parse_response(b"[15000000000000000]").unwrap(), "15000000000000000");
    }
}
