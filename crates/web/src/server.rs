//! Accept loop of the bridge.
//!
//! Every accepted connection gets its own task, wrapped in TLS when an acceptor is configured,
//! and is served by [`HttpConnection`] against the shared [`Dispatcher`].

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bridge_http::connection::HttpConnection;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dispatcher::Dispatcher;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("can't bind {address}: {source}")]
    Bind { address: String, source: io::Error },

    #[error("can't read local address: {source}")]
    LocalAddr { source: io::Error },
}

pub struct Server {
    tcp_listener: TcpListener,
    tls_acceptor: Option<TlsAcceptor>,
    dispatcher: Arc<Dispatcher>,
}

impl Server {
    /// Binds `host:port`; a `None` acceptor serves plain http.
    pub async fn bind(
        host: &str,
        port: u16,
        tls_acceptor: Option<TlsAcceptor>,
        dispatcher: Dispatcher,
    ) -> Result<Self, ServerError> {
        let address = format!("{host}:{port}");
        let tcp_listener =
            TcpListener::bind(address.as_str()).await.map_err(|source| ServerError::Bind { address, source })?;

        Ok(Self { tcp_listener, tls_acceptor, dispatcher: Arc::new(dispatcher) })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.tcp_listener.local_addr().map_err(|source| ServerError::LocalAddr { source })
    }

    pub fn is_tls(&self) -> bool {
        self.tls_acceptor.is_some()
    }

    pub fn protocol(&self) -> &'static str {
        if self.is_tls() { "https" } else { "http" }
    }

    /// Accepts connections until `shutdown` is cancelled.
    ///
    /// Connections already accepted keep running on their own tasks; they end with the runtime.
    pub async fn run(self, shutdown: CancellationToken) {
        match self.local_addr() {
            Ok(address) => info!(protocol = self.protocol(), %address, "start listening"),
            Err(e) => warn!(cause = %e, "start listening at an unknown address"),
        }

        loop {
            let accepted = tokio::select! {
                accepted = self.tcp_listener.accept() => accepted,
                _ = shutdown.cancelled() => {
                    info!("stop accepting connections");
                    return;
                }
            };

            let (tcp_stream, remote_addr) = match accepted {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let dispatcher = Arc::clone(&self.dispatcher);
            let tls_acceptor = self.tls_acceptor.clone();

            tokio::spawn(async move {
                debug!(%remote_addr, "accept connection");
                serve_connection(tcp_stream, tls_acceptor, dispatcher).await;
            });
        }
    }
}

async fn serve_connection(tcp_stream: TcpStream, tls_acceptor: Option<TlsAcceptor>, dispatcher: Arc<Dispatcher>) {
    let result = match tls_acceptor {
        Some(acceptor) => match acceptor.accept(tcp_stream).await {
            Ok(tls_stream) => {
                let (reader, writer) = tokio::io::split(tls_stream);
                HttpConnection::new(reader, writer).process(dispatcher).await
            }
            Err(e) => {
                warn!(cause = %e, "tls handshake failed");
                return;
            }
        },
        None => {
            let (reader, writer) = tcp_stream.into_split();
            HttpConnection::new(reader, writer).process(dispatcher).await
        }
    };

    match result {
        Ok(()) => debug!("finished process, connection shutdown"),
        Err(e) => error!("service has error, cause {}, connection shutdown", e),
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("local_addr", &self.tcp_listener.local_addr().ok())
            .field("tls", &self.is_tls())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::capability::LocalCapabilities;
    use crate::static_files::StaticFiles;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn read_until(stream: &mut TcpStream, needle: &str) -> String {
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf)).await.unwrap().unwrap();
            assert_ne!(n, 0, "connection closed before `{needle}` arrived");
            received.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&received).into_owned();
            if text.contains(needle) {
                return text;
            }
        }
    }

    async fn start(dir: &std::path::Path, shutdown: &CancellationToken) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let dispatcher = Dispatcher::new(
            api::route_table().unwrap(),
            Arc::new(LocalCapabilities::new(dir, shutdown.clone())),
            StaticFiles::new(dir),
            dir.join("api.js"),
        );
        let server = Server::bind("127.0.0.1", 0, None, dispatcher).await.unwrap();
        assert_eq!(server.protocol(), "http");
        let address = server.local_addr().unwrap();
        (address, tokio::spawn(server.run(shutdown.clone())))
    }

    #[tokio::test]
    async fn serves_static_and_api_over_one_connection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<p>bridge</p>").unwrap();
        std::fs::write(dir.path().join("note.txt"), "from disk").unwrap();

        let shutdown = CancellationToken::new();
        let (address, running) = start(dir.path(), &shutdown).await;

        let mut stream = TcpStream::connect(address).await.unwrap();
        stream.write_all(b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();
        let response = read_until(&mut stream, "<p>bridge</p>").await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));

        stream.write_all(b"GET /api/fs/readtext?args=%22note.txt%22 HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();
        let response = read_until(&mut stream, "from disk").await;
        assert!(response.contains("HTTP/1.1 200 OK"));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), running).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn undecodable_body_drops_only_its_connection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("note.txt"), "from disk").unwrap();

        let shutdown = CancellationToken::new();
        let (address, running) = start(dir.path(), &shutdown).await;

        let mut broken = TcpStream::connect(address).await.unwrap();
        broken
            .write_all(b"PUT /api/fs/readtext HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 5\r\n\r\n{nope")
            .await
            .unwrap();
        let mut received = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), broken.read_to_end(&mut received)).await.unwrap().unwrap();
        assert!(received.is_empty(), "got {}", String::from_utf8_lossy(&received));

        let mut healthy = TcpStream::connect(address).await.unwrap();
        healthy.write_all(b"GET /api/fs/readtext?args=%22note.txt%22 HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();
        let response = read_until(&mut healthy, "from disk").await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), running).await.unwrap().unwrap();
    }
}
