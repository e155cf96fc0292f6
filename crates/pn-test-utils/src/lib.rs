//! A minimal HTTP origin for integration tests: accepts one connection
//! at a time on a loopback port and replies with a fixed, caller-supplied
//! byte sequence to every request it reads. Not meant to parse the
//! request beyond finding the blank line that ends the headers.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct MockOrigin {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl MockOrigin {
    /// Start a mock origin that replies with `response` (a full raw HTTP
    /// response, status line through body) to every request it accepts,
    /// up to `connections` times.
    pub async fn start(response: Vec<u8>, connections: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock origin");
        let addr = listener.local_addr().expect("local addr");

        let handle = tokio::spawn(async move {
            for _ in 0..connections {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let response = response.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    loop {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => {
                                if buf[..n].windows(4).any(|w| w == b"\r\n\r\n") {
                                    break;
                                }
                            }
                        }
                    }
                    let _ = socket.write_all(&response).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        MockOrigin { addr, handle }
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

impl Drop for MockOrigin {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Build a minimal, well-formed `200 OK` JSON response with the given body.
pub fn json_response(body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
    .into_bytes()
}
