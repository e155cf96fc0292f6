//! Presence: here-now, where-now, set/get state, and the heartbeat
//! transaction auto-heartbeat periodically re-issues.

use pn_protocol::Outcome;

use crate::config::PubNubConfig;
use crate::fsm::Request;
use crate::sign::QueryBuilder;

pub fn here_now(config: &PubNubConfig, channels: &[String], now_unix: i64) -> Request {
    let path = format!(
        "/v2/presence/sub-key/{sub_key}/channel/{chans}",
        sub_key = config.keys.subscribe_key,
        chans = crate::sign::percent_encode(&channels.join(",")),
    );
    super::build_request(config, "GET", path, QueryBuilder::new(config), None, now_unix)
}

pub fn global_here_now(config: &PubNubConfig, now_unix: i64) -> Request {
    let path = format!("/v2/presence/sub-key/{sub_key}", sub_key = config.keys.subscribe_key);
    super::build_request(config, "GET", path, QueryBuilder::new(config), None, now_unix)
}

pub fn where_now(config: &PubNubConfig, uuid: &str, now_unix: i64) -> Request {
    let path = format!(
        "/v2/presence/sub-key/{sub_key}/uuid/{uuid}",
        sub_key = config.keys.subscribe_key,
        uuid = crate::sign::percent_encode(uuid),
    );
    super::build_request(config, "GET", path, QueryBuilder::new(config), None, now_unix)
}

pub fn set_state(
    config: &PubNubConfig,
    channels: &[String],
    state_json: &str,
    now_unix: i64,
) -> Request {
    let path = format!(
        "/v2/presence/sub-key/{sub_key}/channel/{chans}/uuid/{uuid}/data",
        sub_key = config.keys.subscribe_key,
        chans = crate::sign::percent_encode(&channels.join(",")),
        uuid = crate::sign::percent_encode(&config.user_id),
    );
    let query = QueryBuilder::new(config).push("state", state_json.to_owned());
    super::build_request(config, "GET", path, query, None, now_unix)
}

pub fn get_state(config: &PubNubConfig, channels: &[String], uuid: &str, now_unix: i64) -> Request {
    let path = format!(
        "/v2/presence/sub-key/{sub_key}/channel/{chans}/uuid/{uuid}",
        sub_key = config.keys.subscribe_key,
        chans = crate::sign::percent_encode(&channels.join(",")),
        uuid = crate::sign::percent_encode(uuid),
    );
    super::build_request(config, "GET", path, QueryBuilder::new(config), None, now_unix)
}

pub fn heartbeat(
    config: &PubNubConfig,
    channels: &[String],
    channel_groups: &[String],
    now_unix: i64,
) -> Request {
    let chans = if channels.is_empty() { ",".to_owned() } else { channels.join(",") };
    let path = format!(
        "/v2/presence/sub-key/{sub_key}/channel/{chans}/heartbeat",
        sub_key = config.keys.subscribe_key,
        chans = crate::sign::percent_encode(&chans),
    );
    let mut query = QueryBuilder::new(config);
    if !channel_groups.is_empty() {
        query = query.push("channel-group", channel_groups.join(","));
    }
    super::build_request(config, "GET", path, query, None, now_unix)
}

pub fn parse_data_response(body: &[u8]) -> Result<serde_json::Value, Outcome> {
    let data = super::parse_generic(body)?;
    serde_json::from_slice(data).map_err(|_| Outcome::FormatError)
}
