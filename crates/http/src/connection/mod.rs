//! HTTP connection handling module
//!
//! [`HttpConnection`] drives one client connection: it decodes a request, collects its body,
//! hands it to the handler and writes the response back, then waits for the next request on
//! the same connection.

mod http_connection;

pub use http_connection::HttpConnection;
