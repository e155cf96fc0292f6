//! Object metadata (`pbcc_objects_api.c`, `SPEC_FULL.md` §4): UUID and
//! channel metadata CRUD. Membership/member list variants are out of
//! scope for this port (see `DESIGN.md` Open Questions).

use pn_protocol::Outcome;

use crate::config::PubNubConfig;
use crate::fsm::Request;
use crate::sign::QueryBuilder;

pub fn get_uuid_metadata(config: &PubNubConfig, uuid: &str, now_unix: i64) -> Request {
    let path = format!(
        "/v2/objects/{sub_key}/uuids/{uuid}",
        sub_key = config.keys.subscribe_key,
        uuid = crate::sign::percent_encode(uuid),
    );
    super::build_request(config, "GET", path, QueryBuilder::new(config), None, now_unix)
}

pub fn set_uuid_metadata(config: &PubNubConfig, uuid: &str, metadata_json: &str, now_unix: i64) -> Request {
    let path = format!(
        "/v2/objects/{sub_key}/uuids/{uuid}",
        sub_key = config.keys.subscribe_key,
        uuid = crate::sign::percent_encode(uuid),
    );
    super::build_request(
        config,
        "PATCH",
        path,
        QueryBuilder::new(config),
        Some(metadata_json.as_bytes().to_vec()),
        now_unix,
    )
}

pub fn remove_uuid_metadata(config: &PubNubConfig, uuid: &str, now_unix: i64) -> Request {
    let path = format!(
        "/v2/objects/{sub_key}/uuids/{uuid}",
        sub_key = config.keys.subscribe_key,
        uuid = crate::sign::percent_encode(uuid),
    );
    super::build_request(config, "DELETE", path, QueryBuilder::new(config), None, now_unix)
}

pub fn get_channel_metadata(config: &PubNubConfig, channel: &str, now_unix: i64) -> Request {
    let path = format!(
        "/v2/objects/{sub_key}/channels/{chan}",
        sub_key = config.keys.subscribe_key,
        chan = crate::sign::percent_encode(channel),
    );
    super::build_request(config, "GET", path, QueryBuilder::new(config), None, now_unix)
}

pub fn set_channel_metadata(config: &PubNubConfig, channel: &str, metadata_json: &str, now_unix: i64) -> Request {
    let path = format!(
        "/v2/objects/{sub_key}/channels/{chan}",
        sub_key = config.keys.subscribe_key,
        chan = crate::sign::percent_encode(channel),
    );
    super::build_request(
        config,
        "PATCH",
        path,
        QueryBuilder::new(config),
        Some(metadata_json.as_bytes().to_vec()),
        now_unix,
    )
}

pub fn remove_channel_metadata(config: &PubNubConfig, channel: &str, now_unix: i64) -> Request {
    let path = format!(
        "/v2/objects/{sub_key}/channels/{chan}",
        sub_key = config.keys.subscribe_key,
        chan = crate::sign::percent_encode(channel),
    );
    super::build_request(config, "DELETE", path, QueryBuilder::new(config), None, now_unix)
}

pub fn parse_response(body: &[u8]) -> Result<serde_json::Value, Outcome> {
    let data = super::parse_generic(body).map_err(|_| Outcome::ObjectsApiError)?;
    serde_json::from_slice(data).map_err(|_| Outcome::FormatError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Keyset;

    #[test]
    fn uuid_metadata_paths_are_distinct_from_channel_metadata() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let uuid_req = get_uuid_metadata(&cfg, "u1", 0);
        let chan_req = get_channel_metadata(&cfg, "c1", 0);
        assert!(uuid_req.path_and_query.contains("/uuids/u1"));
        assert!(chan_req.path_and_query.contains("/channels/c1"));
    }

    #[test]
    fn set_metadata_is_patch_with_body() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let req = set_uuid_metadata(&cfg, "u1", r#"{"name":"Alice"}"#, 0);
        assert_eq!(req.method, "PATCH");
        assert!(req.body.is_some());
    }
}
