//! The public per-operation API: a thin, typed wrapper over `Context`,
//! `fsm::run`, and the `ops::*` URL builders/parsers.

use std::time::Duration;

use pn_crypto::{AesCbcCryptor, Cryptor, LegacyCryptor};
use pn_protocol::{Cursor, Outcome, OwnedMessage};

use crate::config::PubNubConfig;
use crate::context::Context;
use crate::error::ClientError;
use crate::fsm;
use crate::ops;

/// A PubNub client context (spec §3's "Context"). One instance performs
/// one transaction at a time; wrap in `Arc` to share a cancel handle
/// with another task.
pub struct PubNub {
    ctx: Context,
    cryptor: Option<Box<dyn Cryptor + Send + Sync>>,
    decrypt_cryptors: Vec<Box<dyn Cryptor + Send + Sync>>,
}

impl PubNub {
    pub fn new(config: PubNubConfig) -> Self {
        PubNub {
            ctx: Context::new(config),
            cryptor: None,
            decrypt_cryptors: Vec::new(),
        }
    }

    /// Enable message encryption with the current AES-CBC scheme for
    /// outgoing publishes; both schemes remain registered for incoming
    /// decryption since the envelope is self-describing (spec §4.6).
    pub fn with_cipher_key(mut self, cipher_key: &str) -> Self {
        self.cryptor = Some(Box::new(AesCbcCryptor::new(cipher_key.as_bytes())));
        self.decrypt_cryptors = vec![
            Box::new(AesCbcCryptor::new(cipher_key.as_bytes())),
            Box::new(LegacyCryptor::new(cipher_key.as_bytes())),
        ];
        self
    }

    pub fn cancel(&self) {
        self.ctx.cancel();
    }

    pub fn cursor(&self) -> &Cursor {
        &self.ctx.cursor
    }

    fn now_unix(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    async fn run(&mut self, request: fsm::Request) -> Result<Vec<u8>, ClientError> {
        let _permit = self.ctx.begin_transaction()?;
        self.ctx.heartbeat.disarm_for_user_transaction();
        let result = fsm::run(&mut self.ctx, request).await;
        self.ctx.heartbeat.rearm_after_transaction();
        if result.outcome.is_ok() || result.outcome == Outcome::HttpError {
            Ok(result.body)
        } else {
            Err(ClientError::Outcome(result.outcome))
        }
    }

    pub async fn publish(&mut self, channel: &str, message: &str) -> Result<String, ClientError> {
        let ciphertext = match &self.cryptor {
            Some(c) => Some(pn_crypto::encrypt_message(c.as_ref(), message.as_bytes())?),
            None => None,
        };
        let now = self.now_unix();
        let request = ops::publish::build_request(&self.ctx.config, channel, message, ciphertext.as_deref(), now);
        let body = self.run(request).await?;
        let result = ops::publish::parse_response(&body)?;
        Ok(result.timetoken)
    }

    /// Subscribe once, feeding the context's current cursor and
    /// advancing it from the response. Transparently decrypts payloads
    /// that carry a recognized envelope header when a cipher key is
    /// configured; payloads without one pass through unchanged.
    pub async fn subscribe(
        &mut self,
        channels: &[String],
        channel_groups: &[String],
    ) -> Result<Vec<OwnedMessage>, ClientError> {
        let now = self.now_unix();
        let cursor = self.ctx.cursor.clone();
        let request = ops::subscribe::build_request(&self.ctx.config, channels, channel_groups, &cursor, now);
        let body = self.run(request).await?;
        let mut messages = ops::subscribe::parse_response(&body, &mut self.ctx.cursor)?;

        if !self.decrypt_cryptors.is_empty() {
            for message in &mut messages {
                if let Ok(decrypted) = self.try_decrypt(&message.payload) {
                    message.payload = decrypted;
                }
            }
        }
        Ok(messages)
    }

    fn try_decrypt(&self, payload: &str) -> Result<String, ClientError> {
        let unquoted = payload.trim_matches('"');
        let refs: Vec<&dyn Cryptor> = self.decrypt_cryptors.iter().map(|c| c.as_ref()).collect();
        let plaintext = pn_crypto::decrypt_message(&refs, unquoted)?;
        String::from_utf8(plaintext).map_err(|_| ClientError::Outcome(Outcome::CryptoNotSupported))
    }

    pub async fn here_now(&mut self, channels: &[String]) -> Result<serde_json::Value, ClientError> {
        let now = self.now_unix();
        let request = ops::presence::here_now(&self.ctx.config, channels, now);
        let body = self.run(request).await?;
        ops::presence::parse_data_response(&body).map_err(ClientError::from)
    }

    pub async fn where_now(&mut self, uuid: &str) -> Result<serde_json::Value, ClientError> {
        let now = self.now_unix();
        let request = ops::presence::where_now(&self.ctx.config, uuid, now);
        let body = self.run(request).await?;
        ops::presence::parse_data_response(&body).map_err(ClientError::from)
    }

    pub async fn set_state(&mut self, channels: &[String], state_json: &str) -> Result<(), ClientError> {
        let now = self.now_unix();
        let request = ops::presence::set_state(&self.ctx.config, channels, state_json, now);
        let body = self.run(request).await?;
        ops::presence::parse_data_response(&body)?;
        Ok(())
    }

    pub async fn get_state(&mut self, channels: &[String], uuid: &str) -> Result<serde_json::Value, ClientError> {
        let now = self.now_unix();
        let request = ops::presence::get_state(&self.ctx.config, channels, uuid, now);
        let body = self.run(request).await?;
        ops::presence::parse_data_response(&body).map_err(ClientError::from)
    }

    pub async fn history(&mut self, query: &ops::history::HistoryQuery<'_>) -> Result<serde_json::Value, ClientError> {
        let now = self.now_unix();
        let request = ops::history::build_request(&self.ctx.config, query, now);
        let body = self.run(request).await?;
        ops::history::parse_response(&body).map_err(ClientError::from)
    }

    pub async fn history_with_actions(
        &mut self,
        query: &ops::history::HistoryQuery<'_>,
    ) -> Result<serde_json::Value, ClientError> {
        let now = self.now_unix();
        let request = ops::history::build_request_with_actions(&self.ctx.config, query, now);
        let body = self.run(request).await?;
        ops::history::parse_response(&body).map_err(ClientError::from)
    }

    pub async fn add_action(
        &mut self,
        channel: &str,
        message_timetoken: &str,
        action_type: &str,
        value: &str,
    ) -> Result<serde_json::Value, ClientError> {
        let now = self.now_unix();
        let request = ops::actions::add_action(&self.ctx.config, channel, message_timetoken, action_type, value, now);
        let body = self.run(request).await?;
        ops::actions::parse_response(&body).map_err(ClientError::from)
    }

    pub async fn remove_action(
        &mut self,
        channel: &str,
        message_timetoken: &str,
        action_timetoken: &str,
    ) -> Result<(), ClientError> {
        let now = self.now_unix();
        let request = ops::actions::remove_action(&self.ctx.config, channel, message_timetoken, action_timetoken, now);
        let body = self.run(request).await?;
        ops::actions::parse_response(&body)?;
        Ok(())
    }

    pub async fn get_actions(&mut self, channel: &str) -> Result<serde_json::Value, ClientError> {
        let now = self.now_unix();
        let request = ops::actions::get_actions(&self.ctx.config, channel, None, None, None, now);
        let body = self.run(request).await?;
        ops::actions::parse_response(&body).map_err(ClientError::from)
    }

    pub async fn grant_token(&mut self, grant: &ops::grant_revoke::GrantRequest) -> Result<String, ClientError> {
        let now = self.now_unix();
        let request = ops::grant_revoke::grant_token(&self.ctx.config, grant, now);
        let body = self.run(request).await?;
        ops::grant_revoke::parse_grant_response(&body).map_err(ClientError::from)
    }

    pub async fn revoke_token(&mut self, token: &str) -> Result<(), ClientError> {
        let now = self.now_unix();
        let request = ops::grant_revoke::revoke_token(&self.ctx.config, token, now);
        let body = self.run(request).await?;
        ops::grant_revoke::parse_revoke_response(&body)?;
        Ok(())
    }

    pub async fn time(&mut self) -> Result<String, ClientError> {
        let now = self.now_unix();
        let request = ops::time::build_request(&self.ctx.config, now);
        let body = self.run(request).await?;
        ops::time::parse_response(&body).map_err(ClientError::from)
    }

    pub async fn get_uuid_metadata(&mut self, uuid: &str) -> Result<serde_json::Value, ClientError> {
        let now = self.now_unix();
        let request = ops::objects::get_uuid_metadata(&self.ctx.config, uuid, now);
        let body = self.run(request).await?;
        ops::objects::parse_response(&body).map_err(ClientError::from)
    }

    pub async fn set_uuid_metadata(&mut self, uuid: &str, metadata_json: &str) -> Result<serde_json::Value, ClientError> {
        let now = self.now_unix();
        let request = ops::objects::set_uuid_metadata(&self.ctx.config, uuid, metadata_json, now);
        let body = self.run(request).await?;
        ops::objects::parse_response(&body).map_err(ClientError::from)
    }

    pub async fn remove_uuid_metadata(&mut self, uuid: &str) -> Result<(), ClientError> {
        let now = self.now_unix();
        let request = ops::objects::remove_uuid_metadata(&self.ctx.config, uuid, now);
        let body = self.run(request).await?;
        ops::objects::parse_response(&body)?;
        Ok(())
    }

    pub async fn get_channel_metadata(&mut self, channel: &str) -> Result<serde_json::Value, ClientError> {
        let now = self.now_unix();
        let request = ops::objects::get_channel_metadata(&self.ctx.config, channel, now);
        let body = self.run(request).await?;
        ops::objects::parse_response(&body).map_err(ClientError::from)
    }

    pub async fn set_channel_metadata(
        &mut self,
        channel: &str,
        metadata_json: &str,
    ) -> Result<serde_json::Value, ClientError> {
        let now = self.now_unix();
        let request = ops::objects::set_channel_metadata(&self.ctx.config, channel, metadata_json, now);
        let body = self.run(request).await?;
        ops::objects::parse_response(&body).map_err(ClientError::from)
    }

    pub async fn remove_channel_metadata(&mut self, channel: &str) -> Result<(), ClientError> {
        let now = self.now_unix();
        let request = ops::objects::remove_channel_metadata(&self.ctx.config, channel, now);
        let body = self.run(request).await?;
        ops::objects::parse_response(&body)?;
        Ok(())
    }

    pub async fn add_channels_to_group(&mut self, group: &str, channels: &[String]) -> Result<(), ClientError> {
        let now = self.now_unix();
        let request = ops::channel_registry::add(&self.ctx.config, group, channels, now);
        let body = self.run(request).await?;
        ops::channel_registry::parse_response(&body)?;
        Ok(())
    }

    pub async fn remove_channels_from_group(&mut self, group: &str, channels: &[String]) -> Result<(), ClientError> {
        let now = self.now_unix();
        let request = ops::channel_registry::remove(&self.ctx.config, group, channels, now);
        let body = self.run(request).await?;
        ops::channel_registry::parse_response(&body)?;
        Ok(())
    }

    pub async fn list_channel_group(&mut self, group: &str) -> Result<serde_json::Value, ClientError> {
        let now = self.now_unix();
        let request = ops::channel_registry::list(&self.ctx.config, group, now);
        let body = self.run(request).await?;
        ops::channel_registry::parse_response(&body).map_err(ClientError::from)
    }

    /// Enable the auto-heartbeat ("thumper", spec §4.8) for the given
    /// channels/groups. A caller that wants it actually driven on a
    /// timer registers its own `tokio::time::interval` or the shared
    /// `scheduler::Scheduler`, and calls `ops::presence::heartbeat`
    /// directly when `heartbeat_should_fire` is true — see
    /// `demos/console` for a worked example.
    pub fn enable_heartbeat(&mut self, period: Duration, channels: Vec<String>, channel_groups: Vec<String>) {
        self.ctx.heartbeat.enable(period, channels, channel_groups);
    }

    pub fn disable_heartbeat(&mut self) {
        self.ctx.heartbeat.disable();
    }

    pub fn heartbeat_should_fire(&self) -> bool {
        self.ctx.heartbeat.should_fire()
    }

    pub async fn send_heartbeat(&mut self) -> Result<(), ClientError> {
        let (channels, groups) = (self.ctx.heartbeat.channels(), self.ctx.heartbeat.channel_groups());
        let now = self.now_unix();
        let request = ops::presence::heartbeat(&self.ctx.config, &channels, &groups, now);
        let body = self.run(request).await?;
        ops::presence::parse_data_response(&body)?;
        Ok(())
    }
}
