//! Message actions (`pbcc_actions_api.c`, `SPEC_FULL.md` §4):
//! add-action, remove-action, get-actions, sharing the URL family
//! `/v1/message-actions/<sub>/channel/<chan>[/message/<mt>[/action/<at>]]`.

use pn_protocol::Outcome;

use crate::config::PubNubConfig;
use crate::fsm::Request;
use crate::sign::QueryBuilder;

pub fn add_action(
    config: &PubNubConfig,
    channel: &str,
    message_timetoken: &str,
    action_type: &str,
    value: &str,
    now_unix: i64,
) -> Request {
    let path = format!(
        "/v1/message-actions/{sub_key}/channel/{chan}/message/{mt}",
        sub_key = config.keys.subscribe_key,
        chan = crate::sign::percent_encode(channel),
        mt = crate::sign::percent_encode(message_timetoken),
    );
    let body = serde_json::json!({ "type": action_type, "value": value }).to_string().into_bytes();
    super::build_request(config, "POST", path, QueryBuilder::new(config), Some(body), now_unix)
}

pub fn remove_action(
    config: &PubNubConfig,
    channel: &str,
    message_timetoken: &str,
    action_timetoken: &str,
    now_unix: i64,
) -> Request {
    let path = format!(
        "/v1/message-actions/{sub_key}/channel/{chan}/message/{mt}/action/{at}",
        sub_key = config.keys.subscribe_key,
        chan = crate::sign::percent_encode(channel),
        mt = crate::sign::percent_encode(message_timetoken),
        at = crate::sign::percent_encode(action_timetoken),
    );
    super::build_request(config, "DELETE", path, QueryBuilder::new(config), None, now_unix)
}

pub fn get_actions(
    config: &PubNubConfig,
    channel: &str,
    start: Option<&str>,
    end: Option<&str>,
    limit: Option<u32>,
    now_unix: i64,
) -> Request {
    let path = format!(
        "/v1/message-actions/{sub_key}/channel/{chan}",
        sub_key = config.keys.subscribe_key,
        chan = crate::sign::percent_encode(channel),
    );
    let query = QueryBuilder::new(config)
        .push_opt("start", start.map(str::to_owned))
        .push_opt("end", end.map(str::to_owned))
        .push_opt("limit", limit.map(|v| v.to_string()));
    super::build_request(config, "GET", path, query, None, now_unix)
}

pub fn parse_response(body: &[u8]) -> Result<serde_json::Value, Outcome> {
    let data = super::parse_generic(body).map_err(|_| Outcome::ActionsApiError)?;
    serde_json::from_slice(data).map_err(|_| Outcome::FormatError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Keyset;

    #[test]
    fn add_action_posts_type_and_value() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let req = add_action(&cfg, "chan", "1500000", "reaction", "👍", 0);
        assert_eq!(req.method, "POST");
        let body = String::from_utf8(req.body.unwrap()).unwrap();
        assert!(body.contains("\"type\":\"reaction\""));
    }

    #[test]
    fn remove_action_is_delete_with_both_timetokens_in_path() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let req = remove_action(&cfg, "chan", "1500000", "1500001", 0);
        assert_eq!(req.method, "DELETE");
        assert!(req.path_and_query.contains("/message/1500000/action/1500001"));
    }
}
