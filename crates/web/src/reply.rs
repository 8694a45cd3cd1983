//! Response writing.
//!
//! A [`Reply`] is what a route handler answers with: a status, an optional content type and a
//! body that is either text, raw bytes or absent. [`Reply::into_response`] turns it into the
//! transport response, always adding `Cache-Control: no-store, no-cache`.

use bytes::Bytes;
use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use http::{HeaderValue, Response, StatusCode};
use http_body_util::Full;
use mime::Mime;
use tracing::warn;

const NO_CACHE: HeaderValue = HeaderValue::from_static("no-store, no-cache");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    Empty,
    Text(String),
    Bytes(Bytes),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    status: StatusCode,
    content_type: Option<Mime>,
    body: ReplyBody,
}

impl Reply {
    pub fn new(status: StatusCode, content_type: Option<Mime>, body: ReplyBody) -> Self {
        Self { status, content_type, body }
    }

    /// A reply without content type or body, e.g. `204 No Content`.
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, None, ReplyBody::Empty)
    }

    pub fn text<S: Into<String>>(status: StatusCode, content_type: Mime, text: S) -> Self {
        Self::new(status, Some(content_type), ReplyBody::Text(text.into()))
    }

    pub fn bytes<B: Into<Bytes>>(status: StatusCode, content_type: Mime, bytes: B) -> Self {
        Self::new(status, Some(content_type), ReplyBody::Bytes(bytes.into()))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    pub fn body(&self) -> &ReplyBody {
        &self.body
    }

    /// The bytes that go on the wire; text is UTF-8 encoded.
    pub fn body_bytes(&self) -> Bytes {
        match &self.body {
            ReplyBody::Empty => Bytes::new(),
            ReplyBody::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
            ReplyBody::Bytes(bytes) => bytes.clone(),
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let body = match self.body {
            ReplyBody::Empty => Bytes::new(),
            ReplyBody::Text(text) => Bytes::from(text),
            ReplyBody::Bytes(bytes) => bytes,
        };

        let mut response = Response::new(Full::new(body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        if let Some(content_type) = self.content_type {
            match HeaderValue::from_str(content_type.as_ref()) {
                Ok(value) => {
                    headers.insert(CONTENT_TYPE, value);
                }
                Err(e) => warn!(content_type = %content_type, cause = %e, "skip invalid content type"),
            }
        }
        headers.insert(CACHE_CONTROL, NO_CACHE);

        response
    }
}

/// Builds a transport response; the content type and body are both optional.
pub fn respond(status: StatusCode, content_type: Option<Mime>, body: ReplyBody) -> Response<Full<Bytes>> {
    Reply::new(status, content_type, body).into_response()
}
