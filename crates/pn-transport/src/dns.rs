//! Multi-address resolution and connect failover. We lean on
//! `tokio::net::lookup_host` for the resolver itself (a general-purpose
//! resolver is explicitly out of scope) and only own the "try every
//! returned address in order" policy on top of it.

use std::net::SocketAddr;

use tokio::net::TcpStream;

use crate::error::TransportError;

/// Resolve `host:port` to every address the system resolver returns.
pub async fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>, TransportError> {
    tokio::net::lookup_host((host, port))
        .await
        .map(Iterator::collect)
        .map_err(|source| TransportError::Resolve {
            host: host.to_owned(),
            source,
        })
}

/// Connect to the first address that accepts, trying the rest in order
/// on failure (`pbpal_multiple_addresses` in the origin SDK).
pub async fn connect_with_failover(host: &str, port: u16) -> Result<TcpStream, TransportError> {
    let addrs = resolve(host, port).await?;
    for addr in &addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                tracing::debug!(%addr, error = %err, "connect attempt failed, trying next address");
            }
        }
    }
    Err(TransportError::ConnectExhausted {
        host: host.to_owned(),
    })
}
