//! HTTP codec module for encoding and decoding HTTP messages
//!
//! - [`RequestDecoder`]: decodes incoming requests as a header message followed by payload messages
//! - [`ResponseEncoder`]: encodes outgoing responses from a header message and payload messages
//!
//! Both are `tokio_util::codec` types and are driven by `FramedRead`/`FramedWrite` in
//! [`crate::connection::HttpConnection`].
//!
//! # Example
//!
//! ```
//! use bridge_http::codec::RequestDecoder;
//! use bridge_http::protocol::Message;
//! use bytes::BytesMut;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("PUT /api/exit HTTP/1.1\r\nContent-Length: 2\r\n\r\n{}");
//!
//! let header = decoder.decode(&mut buffer).unwrap();
//! assert!(matches!(header, Some(Message::Header(_))));
//! let body = decoder.decode(&mut buffer).unwrap();
//! assert!(matches!(body, Some(Message::Payload(_))));
//! ```

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
