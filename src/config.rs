//! Context configuration and the `pubnub.toml` keyset file loader.
//!
//! Follows the same raw-then-validate pattern as the teacher's
//! `forwarder::config`: a `RawConfig` with `Option` fields is
//! deserialized from TOML, defaults are applied, and the result is a
//! fully-populated, non-optional config type.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::buffer::DEFAULT_BUFFER_LEN;

/// The maximum response size a single transaction will accept after
/// gzip inflation (`PUBNUB_REPLY_MAXLEN` in the original core).
pub const DEFAULT_REPLY_MAXLEN: usize = 2 * 1024 * 1024;

/// Publish/subscribe key pair, plus the optional secret key that turns
/// on request signing.
#[derive(Debug, Clone)]
pub struct Keyset {
    pub publish_key: String,
    pub subscribe_key: String,
    pub secret_key: Option<String>,
}

impl Keyset {
    pub fn new(publish_key: impl Into<String>, subscribe_key: impl Into<String>) -> Self {
        Keyset {
            publish_key: publish_key.into(),
            subscribe_key: subscribe_key.into(),
            secret_key: None,
        }
    }

    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }
}

/// Per-context configuration: identity, connection, and transaction
/// knobs from spec §3's data model.
#[derive(Debug, Clone)]
pub struct PubNubConfig {
    pub origin: String,
    pub port: u16,
    pub keys: Keyset,
    pub user_id: String,
    pub auth_token: Option<String>,
    pub use_tls: bool,
    pub fallback_to_cleartext: bool,
    pub reuse_tls_session: bool,
    pub use_system_certs: bool,
    pub user_pem: Option<Vec<u8>>,
    pub transaction_timeout: Duration,
    pub wait_for_connect_timeout: Duration,
    pub buffer_len: usize,
    pub reply_maxlen: usize,
    pub compression: bool,
}

impl PubNubConfig {
    pub fn new(keys: Keyset, user_id: impl Into<String>) -> Self {
        PubNubConfig {
            origin: "ps.pndsn.com".to_owned(),
            port: 443,
            keys,
            user_id: user_id.into(),
            auth_token: None,
            use_tls: true,
            fallback_to_cleartext: false,
            reuse_tls_session: true,
            use_system_certs: false,
            user_pem: None,
            transaction_timeout: Duration::from_secs(10),
            wait_for_connect_timeout: Duration::from_secs(5),
            buffer_len: DEFAULT_BUFFER_LEN,
            reply_maxlen: DEFAULT_REPLY_MAXLEN,
            compression: true,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>, port: u16) -> Self {
        self.origin = origin.into();
        self.port = port;
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }

    pub fn with_buffer_len(mut self, len: usize) -> Self {
        self.buffer_len = len;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config is missing required field `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
struct RawFile {
    keyset: Option<RawKeyset>,
    origin: Option<String>,
    port: Option<u16>,
    user_id: Option<String>,
    auth_token: Option<String>,
    use_tls: Option<bool>,
    fallback_to_cleartext: Option<bool>,
    reuse_tls_session: Option<bool>,
    use_system_certs: Option<bool>,
    transaction_timeout_ms: Option<u64>,
    wait_for_connect_timeout_ms: Option<u64>,
    buffer_len: Option<usize>,
    compression: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawKeyset {
    publish_key: Option<String>,
    subscribe_key: Option<String>,
    secret_key: Option<String>,
}

/// Load a [`PubNubConfig`] from a `pubnub.toml` file on disk.
pub fn load_config(path: impl AsRef<Path>) -> Result<PubNubConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    load_config_from_str(&text)
}

/// Parse a [`PubNubConfig`] from an in-memory TOML string, applying
/// defaults for every field not explicitly given.
pub fn load_config_from_str(text: &str) -> Result<PubNubConfig, ConfigError> {
    let raw: RawFile = toml::from_str(text)?;
    let raw_keyset = raw.keyset.ok_or(ConfigError::MissingField("keyset"))?;
    let keys = Keyset {
        publish_key: raw_keyset
            .publish_key
            .ok_or(ConfigError::MissingField("keyset.publish_key"))?,
        subscribe_key: raw_keyset
            .subscribe_key
            .ok_or(ConfigError::MissingField("keyset.subscribe_key"))?,
        secret_key: raw_keyset.secret_key,
    };
    let user_id = raw.user_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut cfg = PubNubConfig::new(keys, user_id);
    if let Some(origin) = raw.origin {
        cfg.origin = origin;
    }
    if let Some(port) = raw.port {
        cfg.port = port;
    }
    cfg.auth_token = raw.auth_token;
    if let Some(v) = raw.use_tls {
        cfg.use_tls = v;
    }
    if let Some(v) = raw.fallback_to_cleartext {
        cfg.fallback_to_cleartext = v;
    }
    if let Some(v) = raw.reuse_tls_session {
        cfg.reuse_tls_session = v;
    }
    if let Some(v) = raw.use_system_certs {
        cfg.use_system_certs = v;
    }
    if let Some(ms) = raw.transaction_timeout_ms {
        cfg.transaction_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = raw.wait_for_connect_timeout_ms {
        cfg.wait_for_connect_timeout = Duration::from_millis(ms);
    }
    if let Some(len) = raw.buffer_len {
        cfg.buffer_len = len;
    }
    if let Some(v) = raw.compression {
        cfg.compression = v;
    }

    Ok(cfg)
}
