use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("DNS resolution failed for {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not connect to any resolved address for {host}")]
    ConnectExhausted { host: String },
    #[error("TLS handshake failed: {0}")]
    Tls(#[source] std::io::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid PEM certificate data")]
    BadCertificate,
}
