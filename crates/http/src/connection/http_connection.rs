use std::error::Error;
use std::fmt::Display;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use http::header::EXPECT;
use http::{Response, StatusCode};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::handler::{Handler, Outcome};
use crate::protocol::{HttpError, Message, ParseError, PayloadItem, PayloadSize, RequestHeader, ResponseHead, SendError};

use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info};

/// An HTTP connection that processes requests one after another
///
/// `HttpConnection` handles the full lifecycle of an HTTP connection, including:
/// - Reading and decoding requests
/// - Collecting the request body before the handler runs
/// - Handling expect-continue mechanism
/// - Writing responses back to clients
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), 8 * 1024),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    /// Serves requests until the peer closes the connection.
    ///
    /// A malformed request is answered with `400 Bad Request` and ends the connection. A
    /// handler that returns `Err` ends the connection without any response.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        loop {
            match self.framed_read.next().await {
                Some(Ok(Message::Header((header, payload_size)))) => {
                    self.do_process(header, payload_size, handler.as_ref()).await?;
                }

                Some(Ok(Message::Payload(_))) => {
                    error!("receive payload item while waiting for a request header");
                    self.do_send_response(build_error_response(StatusCode::BAD_REQUEST)).await?;
                    return Err(ParseError::invalid_body("need header while receive body").into());
                }

                Some(Err(e)) => {
                    error!("can't receive next request, cause {}", e);
                    self.do_send_response(build_error_response(StatusCode::BAD_REQUEST)).await?;
                    return Err(e.into());
                }

                None => {
                    info!("cant read more request, break this connection down");
                    return Ok(());
                }
            }
        }
    }

    async fn do_process<H>(&mut self, header: RequestHeader, payload_size: PayloadSize, handler: &H) -> Result<(), HttpError>
    where
        H: Handler,
    {
        if let Some(value) = header.headers().get(EXPECT) {
            let slice = value.as_bytes();
            if slice.len() >= 4 && &slice[0..4] == b"100-" {
                let writer = self.framed_write.get_mut();
                writer.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").await.map_err(SendError::io)?;
                writer.flush().await.map_err(SendError::io)?;
                info!("receive expect request header, sent continue response");
            }
        }

        let body = self.collect_body(payload_size).await?;
        debug!(method = %header.method(), uri = %header.uri(), body_size = body.len(), "receive request");

        let request = header.body(body);

        match handler.call(request).await {
            Ok(Outcome { response, error }) => {
                let status = response.status();
                // reported even when the peer is gone and the response can't be written
                let sent = self.do_send_response(response).await;
                if let Some(e) = error {
                    error!(status = status.as_u16(), "request failed, cause: {}", e);
                }
                sent
            }
            Err(e) => {
                let e: Box<dyn Error + Send + Sync> = e.into();
                error!("handler refused the request, drop connection without response, cause: {}", e);
                Err(HttpError::handler(e))
            }
        }
    }

    /// Reads payload messages until the end of the current request body.
    async fn collect_body(&mut self, payload_size: PayloadSize) -> Result<Bytes, HttpError> {
        let mut body = BytesMut::with_capacity(payload_size.len().min(64 * 1024) as usize);

        loop {
            match self.framed_read.next().await {
                Some(Ok(Message::Payload(PayloadItem::Chunk(bytes)))) => {
                    // a single chunk covering the whole body needs no copy
                    if body.is_empty() && bytes.len() as u64 == payload_size.len() {
                        self.expect_eof().await?;
                        return Ok(bytes);
                    }
                    body.extend_from_slice(&bytes);
                }
                Some(Ok(Message::Payload(PayloadItem::Eof))) => return Ok(body.freeze()),
                Some(Ok(Message::Header(_))) => {
                    return Err(ParseError::invalid_body("receive request header while reading body").into());
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Err(ParseError::invalid_body("connection closed while reading body").into()),
            }
        }
    }

    async fn expect_eof(&mut self) -> Result<(), HttpError> {
        match self.framed_read.next().await {
            Some(Ok(Message::Payload(PayloadItem::Eof))) => Ok(()),
            Some(Ok(_)) => Err(ParseError::invalid_body("body longer than content-length").into()),
            Some(Err(e)) => Err(e.into()),
            None => Err(ParseError::invalid_body("connection closed while reading body").into()),
        }
    }

    async fn do_send_response<T>(&mut self, response: Response<T>) -> Result<(), HttpError>
    where
        T: Body<Data = Bytes> + Unpin,
        T::Error: Display,
    {
        let (header_parts, mut body) = response.into_parts();

        let payload_size = match body.size_hint().exact() {
            Some(length) => PayloadSize::new_length(length),
            None => return Err(SendError::invalid_body("response body must have an exact size").into()),
        };

        let header = Message::<_, Bytes>::Header((ResponseHead::from_parts(header_parts, ()), payload_size));
        if payload_size.is_empty() {
            // header only, flush it right away
            self.framed_write.send(header).await?;
            return Ok(());
        }
        self.framed_write.feed(header).await?;

        loop {
            match body.frame().await {
                Some(Ok(frame)) => {
                    let Ok(data) = frame.into_data() else {
                        continue;
                    };
                    self.framed_write.feed(Message::Payload(PayloadItem::Chunk(data))).await?;
                }
                Some(Err(e)) => return Err(SendError::invalid_body(format!("resolve response body error: {e}")).into()),
                None => {
                    self.framed_write.send(Message::Payload(PayloadItem::<Bytes>::Eof)).await?;
                    return Ok(());
                }
            }
        }
    }
}

fn build_error_response(status_code: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status_code;
    response
}
