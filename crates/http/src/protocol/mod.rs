//! Core HTTP protocol types of the transport.
//!
//! - **Message Handling** ([`message`]): [`Message`] is either a header or a payload item,
//!   [`PayloadItem`] is a body chunk or the end marker, [`PayloadSize`] is the body framing
//! - **Request Processing** ([`request`]): [`RequestHeader`] wraps the parsed request line and headers
//! - **Response Processing** ([`response`]): [`ResponseHead`] is a response before its body is attached
//! - **Error Handling** ([`error`]): [`HttpError`], [`ParseError`] and [`SendError`]

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::RequestHeader;

mod response;
pub use response::ResponseHead;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
