//! HTTP response encoder module
//!
//! Encodes a response as a header message followed by payload messages. The payload encoder
//! is picked from the [`PayloadSize`] announced with the header and dropped once the body is
//! complete, so the next header starts a new response.

use crate::codec::body::PayloadEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Message, PayloadSize, ResponseHead, SendError};
use bytes::{Buf, BytesMut};
use std::io;
use std::io::ErrorKind;
use tokio_util::codec::Encoder;
use tracing::error;

pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self { header_encoder: HeaderEncoder, payload_encoder: None }
    }
}

impl<D: Buf> Encoder<Message<(ResponseHead, PayloadSize), D>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Message<(ResponseHead, PayloadSize), D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::Header((head, payload_size)) => {
                if self.payload_encoder.is_some() {
                    error!("expect payload item but receive response head");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                }

                self.payload_encoder = Some(payload_size.into());
                self.header_encoder.encode((head, payload_size), dst)
            }

            Message::Payload(payload_item) => {
                let Some(payload_encoder) = &mut self.payload_encoder else {
                    error!("expect response header but receive payload item");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                };

                let result = payload_encoder.encode(payload_item, dst);

                if payload_encoder.is_finish() {
                    self.payload_encoder.take();
                }

                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PayloadItem;
    use bytes::Bytes;
    use http::{Response, StatusCode};

    #[test]
    fn header_and_body() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        let head = Response::builder().status(StatusCode::OK).header("Content-Type", "text/plain").body(()).unwrap();
        encoder.encode(Message::<_, Bytes>::Header((head, PayloadSize::Length(5))), &mut dst).unwrap();
        encoder.encode(Message::Payload(PayloadItem::Chunk(Bytes::from_static(b"hello"))), &mut dst).unwrap();
        encoder.encode(Message::Payload(PayloadItem::<Bytes>::Eof), &mut dst).unwrap();

        let encoded = String::from_utf8(dst.to_vec()).unwrap();
        assert!(encoded.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(encoded.contains("content-length: 5\r\n"));
        assert!(encoded.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn payload_before_header() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        let result = encoder.encode(Message::Payload(PayloadItem::Chunk(Bytes::from_static(b"x"))), &mut dst);
        assert!(result.is_err());
    }

    #[test]
    fn second_header_while_body_pending() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        let head = || Response::builder().status(StatusCode::OK).body(()).unwrap();
        encoder.encode(Message::<_, Bytes>::Header((head(), PayloadSize::Length(3))), &mut dst).unwrap();

        let result = encoder.encode(Message::<_, Bytes>::Header((head(), PayloadSize::Empty)), &mut dst);
        assert!(result.is_err());
    }
}
