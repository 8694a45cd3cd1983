//! Decoder for request bodies framed by the `Content-Length` header.
//!
//! Exactly `Content-Length` bytes are taken from the stream; anything after them belongs
//! to the next request on the connection.

use std::cmp;

use crate::protocol::{ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Tracks the bytes still owed by the current request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    remaining: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }

    #[allow(dead_code, reason = "used by tests")]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// * `Ok(Some(PayloadItem::Eof))` once every byte has been handed out
    /// * `Ok(Some(PayloadItem::Chunk(bytes)))` with at most `remaining` bytes
    /// * `Ok(None)` when the buffer is empty and more data is needed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.remaining == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let len = cmp::min(self.remaining, src.len() as u64);
        let bytes = src.split_to(len as usize).freeze();

        self.remaining -= bytes.len() as u64;
        Ok(Some(PayloadItem::Chunk(bytes)))
    }

    /// The peer closed the connection: a body that is still owed bytes is truncated.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None => Err(ParseError::invalid_body(format!("connection closed with {} body bytes missing", self.remaining))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_exactly_content_length() {
        let mut buffer = BytesMut::from(&b"{\"path\":\"a.txt\"}GET / HTTP/1.1\r\n"[..]);

        let mut length_decoder = LengthDecoder::new(16);
        let payload = length_decoder.decode(&mut buffer).unwrap().unwrap();

        assert_eq!(payload.as_bytes().map(|b| &b[..]), Some(&b"{\"path\":\"a.txt\"}"[..]));
        assert_eq!(length_decoder.remaining(), 0);
        assert_eq!(&buffer[..], b"GET / HTTP/1.1\r\n");

        assert_eq!(length_decoder.decode(&mut buffer).unwrap(), Some(PayloadItem::Eof));
    }

    #[test]
    fn split_across_reads() {
        let mut length_decoder = LengthDecoder::new(10);

        let mut buffer = BytesMut::from(&b"01234"[..]);
        let first = length_decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(first.as_bytes().map(|b| b.len()), Some(5));
        assert!(length_decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"56789");
        let second = length_decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(second.as_bytes().map(|b| &b[..]), Some(&b"56789"[..]));
        assert_eq!(length_decoder.decode(&mut buffer).unwrap(), Some(PayloadItem::Eof));
    }

    #[test]
    fn truncated_body() {
        let mut length_decoder = LengthDecoder::new(10);
        let mut buffer = BytesMut::new();

        assert!(matches!(length_decoder.decode_eof(&mut buffer), Err(ParseError::InvalidBody { .. })));
    }
}
