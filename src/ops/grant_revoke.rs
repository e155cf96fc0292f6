//! PAM grant/revoke token v3 (`pbcc_grant_token_api.c`, `SPEC_FULL.md`
//! §4): a signed POST carrying a permissions-by-resource map with a TTL,
//! and a signed DELETE by token.

use serde::Serialize;

use pn_protocol::Outcome;

use crate::config::PubNubConfig;
use crate::fsm::Request;
use crate::sign::QueryBuilder;

bitflags::bitflags! {
    /// Bitmask permissions a grant applies to one resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Permissions: u16 {
        const READ = 0b0000_0001;
        const WRITE = 0b0000_0010;
        const MANAGE = 0b0000_0100;
        const DELETE = 0b0000_1000;
        const GET = 0b0001_0000;
        const UPDATE = 0b0010_0000;
        const JOIN = 0b0100_0000;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GrantRequest {
    pub ttl_minutes: u32,
    pub authorized_uuid: Option<String>,
    pub channels: Vec<(String, Permissions)>,
    pub channel_groups: Vec<(String, Permissions)>,
    pub uuids: Vec<(String, Permissions)>,
}

#[derive(Serialize)]
struct GrantBody {
    ttl: u32,
    permissions: GrantPermissionsBody,
}

#[derive(Serialize)]
struct GrantPermissionsBody {
    #[serde(rename = "uuid", skip_serializing_if = "Option::is_none")]
    authorized_uuid: Option<String>,
    resources: GrantResources,
}

#[derive(Serialize, Default)]
struct GrantResources {
    channels: std::collections::BTreeMap<String, u16>,
    groups: std::collections::BTreeMap<String, u16>,
    uuids: std::collections::BTreeMap<String, u16>,
}

pub fn grant_token(config: &PubNubConfig, grant: &GrantRequest, now_unix: i64) -> Request {
    let path = format!("/v3/pam/{sub_key}/grant", sub_key = config.keys.subscribe_key);
    let body = GrantBody {
        ttl: grant.ttl_minutes,
        permissions: GrantPermissionsBody {
            authorized_uuid: grant.authorized_uuid.clone(),
            resources: GrantResources {
                channels: grant.channels.iter().map(|(k, v)| (k.clone(), v.bits())).collect(),
                groups: grant.channel_groups.iter().map(|(k, v)| (k.clone(), v.bits())).collect(),
                uuids: grant.uuids.iter().map(|(k, v)| (k.clone(), v.bits())).collect(),
            },
        },
    };
    let body_bytes = serde_json::to_vec(&body).expect("grant body always serializes");
    super::build_request(config, "POST", path, QueryBuilder::new(config), Some(body_bytes), now_unix)
}

pub fn revoke_token(config: &PubNubConfig, token: &str, now_unix: i64) -> Request {
    let path = format!(
        "/v3/pam/{sub_key}/grant/{token}",
        sub_key = config.keys.subscribe_key,
        token = crate::sign::percent_encode(token),
    );
    super::build_request(config, "DELETE", path, QueryBuilder::new(config), None, now_unix)
}

pub fn parse_grant_response(body: &[u8]) -> Result<String, Outcome> {
    let data = super::parse_generic(body).map_err(|_| Outcome::GrantTokenApiError)?;
    let value: serde_json::Value = serde_json::from_slice(data).map_err(|_| Outcome::FormatError)?;
    value
        .as_str()
        .map(str::to_owned)
        .or_else(|| value.get("token").and_then(|v| v.as_str()).map(str::to_owned))
        .ok_or(Outcome::FormatError)
}

pub fn parse_revoke_response(body: &[u8]) -> Result<(), Outcome> {
    super::parse_generic(body).map_err(|_| Outcome::RevokeTokenApiError)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Keyset;

    #[test]
    fn grant_token_posts_permission_map() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo"), "alice");
        let grant = GrantRequest {
            ttl_minutes: 60,
            authorized_uuid: Some("alice".to_owned()),
            channels: vec![("chan".to_owned(), Permissions::READ | Permissions::WRITE)],
            channel_groups: vec![],
            uuids: vec![],
        };
        let req = grant_token(&cfg, &grant, 0);
        assert_eq!(req.method, "POST");
        let body = String::from_utf8(req.body.unwrap()).unwrap();
        assert!(body.contains("\"ttl\":60"));
        assert!(body.contains("\"chan\":3"));
    }

    #[test]
    fn revoke_token_is_signed_delete_by_token() {
        let cfg = PubNubConfig::new(Keyset::new("demo", "demo").with_secret_key("shh"), "alice");
        let req = revoke_token(&cfg, "tok123", 0);
        assert_eq!(req.method, "DELETE");
        assert!(req.path_and_query.contains("/grant/tok123"));
        assert!(req.path_and_query.contains("signature="));
    }
}
