//! One module per transaction kind (spec §3's transaction-kind list).
//! Each module owns its own URL-build and response-parse functions —
//! the `pbcc_*_prep` helpers' role in the original core — and the FSM
//! (`fsm::run`) consumes the resulting [`fsm::Request`] opaquely,
//! leaving decoder selection to whichever `ops::*::parse_response`
//! the caller invokes (`client.rs`) rather than a runtime tag.

pub mod actions;
pub mod channel_registry;
pub mod grant_revoke;
pub mod history;
pub mod objects;
pub mod presence;
pub mod publish;
pub mod subscribe;
pub mod time;

use pn_protocol::Outcome;

use crate::config::PubNubConfig;
use crate::fsm::Request;
use crate::sign::QueryBuilder;

/// Shared request assembly: host/port from config, a path already
/// containing the non-query portion of the URL, and a finished query
/// string (already signed if a secret key is configured).
pub(crate) fn build_request(
    config: &PubNubConfig,
    method: &'static str,
    path: String,
    query: QueryBuilder,
    body: Option<Vec<u8>>,
    now_unix: i64,
) -> Request {
    let query_string = query.build(config, &path, now_unix);
    Request {
        method,
        host: config.origin.clone(),
        port: config.port,
        path_and_query: format!("{path}?{query_string}"),
        body,
    }
}

/// Parse the generic `{data}`/`{error}` envelope (spec §4.1) that every
/// transaction kind other than subscribe-v2 uses, surfacing the `data`
/// payload as raw JSON bytes on success.
pub(crate) fn parse_generic<'a>(body: &'a [u8]) -> Result<&'a [u8], Outcome> {
    use pn_protocol::generic::{self, GenericReply};
    match generic::extract(body)? {
        GenericReply::Data(span) => Ok(span.slice(body)),
        GenericReply::Error(_) => Err(Outcome::PublishFailed),
    }
}
