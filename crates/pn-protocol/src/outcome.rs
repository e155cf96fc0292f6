use serde::{Deserialize, Serialize};

/// How a transaction ended. Always a value, never both data and error —
/// the caller's sole success/failure signal for the request that just
/// completed.
///
/// Mirrors `enum pubnub_res` in the original C core, extended with the
/// transaction-specific codes the distillation calls out (actions,
/// objects, grant/revoke, subscribe-v2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Ok,
    Timeout,
    ConnectionTimeout,
    ConnectFailed,
    AddrResolutionFailed,
    IoError,
    Aborted,
    HttpError,
    FormatError,
    Cancelled,
    TxBuffTooSmall,
    RxBuffNotEmpty,
    InvalidChannel,
    PublishFailed,
    AccessDenied,
    GroupEmpty,
    ReplyTooBig,
    InternalError,
    CryptoNotSupported,
    /// Subscribe v2: timetoken missing or not a JSON string.
    SubTtFormatError,
    /// Subscribe v2: timetoken present but no region accompanying it.
    SubNoRegError,
    /// Subscribe v2: no timetoken field in the envelope at all.
    SubNoTtError,
    /// Channel-registry (channel group) operation returned an error.
    ChannelRegistryError,
    /// Message-actions operation returned a semantic API error.
    ActionsApiError,
    /// Object-metadata operation returned a semantic API error.
    ObjectsApiError,
    /// Grant-token operation returned a semantic API error.
    GrantTokenApiError,
    /// Revoke-token operation returned a semantic API error.
    RevokeTokenApiError,
}

impl Outcome {
    pub fn is_ok(self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for Outcome {}
