//! TLS configuration: built-in root certificates plus an optional
//! system certificate store and/or user-supplied PEM, SNI, hostname
//! verification, and session-ticket resumption across connections made
//! with the same `TlsConfig`.

use std::io::BufReader;
use std::sync::Arc;

use rustls::RootCertStore;
use rustls::client::{ClientConfig, Resumption};
use rustls::pki_types::{CertificateDer, ServerName};
use tokio_rustls::TlsConnector;

use crate::error::TransportError;

/// Builds `rustls::ClientConfig`s that all share one in-memory session
/// cache, so repeated connections to the same origin can resume a prior
/// TLS session instead of paying for a full handshake each time.
#[derive(Clone)]
pub struct TlsConfig {
    connector: TlsConnector,
}

impl TlsConfig {
    /// Start from the bundled Mozilla root store (stands in for the
    /// origin SDK's small built-in Amazon/Starfield/ISRG bundle — a full
    /// root store is the idiomatic equivalent here).
    pub fn builder() -> TlsConfigBuilder {
        TlsConfigBuilder {
            roots: RootCertStore {
                roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
            },
            reuse_sessions: true,
        }
    }

    pub fn connector(&self) -> &TlsConnector {
        &self.connector
    }

    pub fn server_name(host: &str) -> Result<ServerName<'static>, TransportError> {
        ServerName::try_from(host.to_owned()).map_err(|_| TransportError::BadCertificate)
    }
}

pub struct TlsConfigBuilder {
    roots: RootCertStore,
    reuse_sessions: bool,
}

impl TlsConfigBuilder {
    /// Also trust the OS certificate store.
    pub fn with_system_certs(mut self) -> Result<Self, TransportError> {
        for cert in rustls_native_certs::load_native_certs().certs {
            let _ = self.roots.add(cert);
        }
        Ok(self)
    }

    /// Also trust a user-supplied PEM bundle (the `user-supplied PEM
    /// certificate` configuration knob).
    pub fn with_pem(mut self, pem: &[u8]) -> Result<Self, TransportError> {
        let mut reader = BufReader::new(pem);
        for cert in rustls_pemfile::certs(&mut reader) {
            let cert: CertificateDer<'static> = cert.map_err(|_| TransportError::BadCertificate)?;
            self.roots
                .add(cert)
                .map_err(|_| TransportError::BadCertificate)?;
        }
        Ok(self)
    }

    pub fn reuse_tls_session(mut self, reuse: bool) -> Self {
        self.reuse_sessions = reuse;
        self
    }

    pub fn build(self) -> TlsConfig {
        let mut config = ClientConfig::builder()
            .with_root_certificates(self.roots)
            .with_no_client_auth();
        if self.reuse_sessions {
            config.resumption = Resumption::in_memory_sessions(256);
        }
        TlsConfig {
            connector: TlsConnector::from(Arc::new(config)),
        }
    }
}
