//! HTTP header processing module for encoding and decoding headers
//!
//! - [`HeaderDecoder`]: decodes HTTP request headers from raw bytes, enforcing the header
//!   size and count limits and deriving the body framing
//! - [`HeaderEncoder`]: encodes HTTP response headers, writing the status line and a
//!   `Content-Length` matching the body

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
