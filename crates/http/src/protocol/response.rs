//! HTTP response header handling.
//!
//! A response head is a `http::Response<()>`; the body travels separately as payload items.

use http::Response;

/// Type alias for HTTP response headers before the body is attached.
pub type ResponseHead = Response<()>;
