//! History and history-with-actions
//! (`/v3/history-with-actions/sub-key/<sub>/channel/<chan>`, spec §6).

use pn_protocol::Outcome;

use crate::config::PubNubConfig;
use crate::fsm::Request;
use crate::sign::QueryBuilder;

pub struct HistoryQuery<'a> {
    pub channel: &'a str,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub limit: Option<u32>,
    pub include_meta: bool,
}

pub fn build_request(config: &PubNubConfig, q: &HistoryQuery<'_>, now_unix: i64) -> Request {
    let path = format!(
        "/v3/history/sub-key/{sub_key}/channel/{chan}",
        sub_key = config.keys.subscribe_key,
        chan = crate::sign::percent_encode(q.channel),
    );
    let query = history_query(config, q);
    super::build_request(config, "GET", path, query, None, now_unix)
}

pub fn build_request_with_actions(config: &PubNubConfig, q: &HistoryQuery<'_>, now_unix: i64) -> Request {
    let path = format!(
        "/v3/history-with-actions/sub-key/{sub_key}/channel/{chan}",
        sub_key = config.keys.subscribe_key,
        chan = crate::sign::percent_encode(q.channel),
    );
    let query = history_query(config, q);
    super::build_request(config, "GET", path, query, None, now_unix)
}

fn history_query(config: &PubNubConfig, q: &HistoryQuery<'_>) -> QueryBuilder {
    let mut query = QueryBuilder::new(config)
        .push_opt("start", q.start.map(|v| v.to_string()))
        .push_opt("end", q.end.map(|v| v.to_string()))
        .push_opt("count", q.limit.map(|v| v.to_string()));
    if q.include_meta {
        query = query.push("include_meta", "true".to_owned());
    }
    query
}

pub fn parse_response(body: &[u8]) -> Result<serde_json::Value, Outcome> {
    let data = super::parse_generic(body)?;
    serde_json::from_slice(data).map_err(|_| Outcome::FormatError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Keyset;

    #[test]
    fn builds_history_path_with_optional_params() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let q = HistoryQuery {
            channel: "chan",
            start: Some(1),
            end: None,
            limit: Some(25),
            include_meta: false,
        };
        let req = build_request(&cfg, &q, 0);
        assert!(req.path_and_query.starts_with("/v3/history/sub-key/demo/channel/chan"));
        assert!(req.path_and_query.contains("start=1"));
        assert!(req.path_and_query.contains("count=25"));
        assert!(!req.path_and_query.contains("end="));
    }

    #[test]
    fn history_with_actions_uses_distinct_path() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let q = HistoryQuery { channel: "chan", start: None, end: None, limit: None, include_meta: true };
        let req = build_request_with_actions(&cfg, &q, 0);
        assert!(req.path_and_query.starts_with("/v3/history-with-actions/"));
        assert!(req.path_and_query.contains("include_meta=true"));
    }
}
