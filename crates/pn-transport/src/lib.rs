//! The transport PAL: DNS resolution with multi-address failover,
//! optional TLS (SNI, hostname verification, session-ticket reuse), and
//! a uniform async byte stream regardless of which one a connection
//! ended up using.

pub mod dns;
pub mod error;
pub mod tls;

use tokio::io::{AsyncRead, AsyncWrite};

pub use error::TransportError;
pub use tls::TlsConfig;

/// A connected byte stream, TLS-wrapped or not. Transaction code reads
/// and writes through this without caring which.
pub trait AsyncStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> AsyncStream for T {}

/// Resolve, connect (with multi-address failover), and optionally
/// perform a TLS handshake with SNI + hostname verification.
///
/// When `tls` is `Some` and `fallback_to_cleartext` is set, a handshake
/// failure reconnects in cleartext rather than failing the transaction
/// outright, mirroring the origin SDK's TLS-fallback configuration knob.
pub async fn connect(
    host: &str,
    port: u16,
    tls: Option<&TlsConfig>,
    fallback_to_cleartext: bool,
) -> Result<Box<dyn AsyncStream>, TransportError> {
    let Some(tls) = tls else {
        let stream = dns::connect_with_failover(host, port).await?;
        return Ok(Box::new(stream));
    };

    let plain = dns::connect_with_failover(host, port).await?;
    let server_name = TlsConfig::server_name(host)?;

    match tls.connector().connect(server_name, plain).await {
        Ok(tls_stream) => Ok(Box::new(tls_stream)),
        Err(err) if fallback_to_cleartext => {
            tracing::warn!(%host, error = %err, "TLS handshake failed, falling back to cleartext");
            let stream = dns::connect_with_failover(host, port).await?;
            Ok(Box::new(stream))
        }
        Err(err) => Err(TransportError::Tls(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connect_without_tls_round_trips_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 5];
            sock.read_exact(&mut buf).await.unwrap();
            sock.write_all(&buf).await.unwrap();
        });

        let mut stream = connect(&addr.ip().to_string(), addr.port(), None, false)
            .await
            .unwrap();
        stream.write_all(b"hello").await.unwrap();
        let mut echoed = [0u8; 5];
        stream.read_exact(&mut echoed).await.unwrap();
        assert_eq!(&echoed, b"hello");

        server.await.unwrap();
    }

    #[test]
    fn server_name_rejects_invalid_host() {
        assert!(TlsConfig::server_name("not a valid host!!").is_err());
    }
}
