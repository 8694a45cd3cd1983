//! Argument decoding.
//!
//! A request carries at most one argument. On GET it comes from the query string
//! ([`query`]), on PUT from the body, with the codec chosen by the exact `Content-Type`:
//!
//! - `application/json`: [`json`]
//! - `multipart/form-data`: [`multipart`]

pub mod json;
pub mod multipart;
pub mod query;

use bytes::Bytes;
use http::HeaderValue;

use crate::args::Args;
use crate::error::DispatchError;

pub const APPLICATION_JSON: &str = "application/json";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Decodes a request body into the handler argument.
///
/// Any other content type, including parameters such as `; boundary=`, is rejected.
pub fn decode_body(content_type: Option<&HeaderValue>, body: &Bytes) -> Result<Args, DispatchError> {
    match content_type.map(HeaderValue::as_bytes) {
        Some(ct) if ct == MULTIPART_FORM_DATA.as_bytes() => Ok(Args::Form(multipart::decode(body)?)),
        Some(ct) if ct == APPLICATION_JSON.as_bytes() => json::decode(body),
        other => Err(DispatchError::UnsupportedContentType {
            content_type: other.map(|ct| String::from_utf8_lossy(ct).into_owned()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn codec_by_exact_content_type() {
        let json_body = Bytes::from_static(br#"{"path":"a.txt"}"#);
        let args = decode_body(Some(&HeaderValue::from_static("application/json")), &json_body).unwrap();
        assert_eq!(args, Args::Json(json!({"path": "a.txt"})));

        let form_body = Bytes::from_static(b"--b\r\nContent-Disposition: form-data; name=\"path\"\r\n\r\na.txt\r\n--b--\r\n");
        let args = decode_body(Some(&HeaderValue::from_static("multipart/form-data")), &form_body).unwrap();
        assert_eq!(args.field("path"), Some(&Bytes::from_static(b"a.txt")));
    }

    #[test]
    fn unsupported_content_type() {
        let body = Bytes::from_static(b"{}");

        let with_charset = decode_body(Some(&HeaderValue::from_static("application/json; charset=utf-8")), &body);
        assert!(matches!(with_charset, Err(DispatchError::UnsupportedContentType { content_type: Some(_) })));

        let missing = decode_body(None, &body);
        assert!(matches!(missing, Err(DispatchError::UnsupportedContentType { content_type: None })));
    }
}
