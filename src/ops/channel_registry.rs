//! Channel-group registry: add/remove channels in a group, and list a
//! group's current members. Path family `/v1/channel-registration/
//! sub-key/<sub>/channel-group/<group>`.

use pn_protocol::Outcome;

use crate::config::PubNubConfig;
use crate::fsm::Request;
use crate::sign::QueryBuilder;

pub fn add(config: &PubNubConfig, group: &str, channels: &[String], now_unix: i64) -> Request {
    let path = format!(
        "/v1/channel-registration/sub-key/{sub_key}/channel-group/{group}",
        sub_key = config.keys.subscribe_key,
        group = crate::sign::percent_encode(group),
    );
    let query = QueryBuilder::new(config).push("add", channels.join(","));
    super::build_request(config, "GET", path, query, None, now_unix)
}

pub fn remove(config: &PubNubConfig, group: &str, channels: &[String], now_unix: i64) -> Request {
    let path = format!(
        "/v1/channel-registration/sub-key/{sub_key}/channel-group/{group}",
        sub_key = config.keys.subscribe_key,
        group = crate::sign::percent_encode(group),
    );
    let query = QueryBuilder::new(config).push("remove", channels.join(","));
    super::build_request(config, "GET", path, query, None, now_unix)
}

pub fn list(config: &PubNubConfig, group: &str, now_unix: i64) -> Request {
    let path = format!(
        "/v1/channel-registration/sub-key/{sub_key}/channel-group/{group}",
        sub_key = config.keys.subscribe_key,
        group = crate::sign::percent_encode(group),
    );
    super::build_request(config, "GET", path, QueryBuilder::new(config), None, now_unix)
}

pub fn parse_response(body: &[u8]) -> Result<serde_json::Value, Outcome> {
    let data = super::parse_generic(body).map_err(|_| Outcome::ChannelRegistryError)?;
    serde_json::from_slice(data).map_err(|_| Outcome::FormatError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Keyset;

    #[test]
    fn add_sends_add_query_param() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let req = add(&cfg, "grp", &["a".to_owned(), "b".to_owned()], 0);
        assert!(req.path_and_query.contains("add=a%2Cb") || req.path_and_query.contains("add=a,b"));
    }
}
