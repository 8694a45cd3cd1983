//! The HTTP/1.1 transport of local-bridge
//!
//! This crate provides a small HTTP/1.1 server transport built on top of tokio. It reads one
//! request at a time from a connection, hands the fully received request to a [`handler::Handler`],
//! and writes the handler's response back before reading the next request.
//!
//! # Features
//!
//! - HTTP/1.0 and HTTP/1.1 request parsing via `httparse`
//! - `Content-Length` framed request bodies, collected into [`bytes::Bytes`]
//! - Keep-alive connections, processed strictly request by request
//! - Expect-continue mechanism
//! - Explicit "respond, then report" outcomes through [`handler::Outcome`]
//!
//! # Example
//!
//! ```no_run
//! use bridge_http::connection::HttpConnection;
//! use bridge_http::handler::{make_handler, Outcome};
//! use bytes::Bytes;
//! use http::{Request, Response, StatusCode};
//! use http_body_util::Full;
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             match connection.process(handler).await {
//!                 Ok(_) => info!("finished process, connection shutdown"),
//!                 Err(e) => error!("service has error, cause {}, connection shutdown", e),
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request<Bytes>) -> Result<Outcome, Infallible> {
//!     info!(path = request.uri().path(), body_size = request.body().len(), "receive request");
//!     let response = Response::builder()
//!         .status(StatusCode::OK)
//!         .body(Full::new(Bytes::from_static(b"Hello World!\r\n")))
//!         .unwrap();
//!     Ok(Outcome::ok(response))
//! }
//! ```
//!
//! # Architecture
//!
//! - [`connection`]: connection lifecycle, one request after another
//! - [`protocol`]: protocol types and error types
//! - [`codec`]: request decoding and response encoding
//! - [`handler`]: the handler trait and the [`handler::Outcome`] it produces
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: top-level error type
//! - [`protocol::ParseError`]: request parsing errors
//! - [`protocol::SendError`]: response sending errors
//!
//! # Limitations
//!
//! - HTTP/1.1 only
//! - No chunked transfer encoding: a request without `Content-Length` has an empty body
//! - Maximum header size: 8KB
//! - Maximum number of headers: 64

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
