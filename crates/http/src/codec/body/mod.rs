//! HTTP body handling module for processing request and response payloads
//!
//! Bodies are framed by `Content-Length` only.
//!
//! ## Decoders
//! - [`LengthDecoder`]: processes fixed-length payloads
//! - [`PayloadDecoder`]: selects between a fixed-length body and no body
//!
//! ## Encoders
//! - [`LengthEncoder`]: handles fixed-length payload encoding
//! - [`PayloadEncoder`]: selects between a fixed-length body and no body

mod length_decoder;
mod length_encoder;
mod payload_decoder;
mod payload_encoder;

pub use payload_decoder::PayloadDecoder;
pub use payload_encoder::PayloadEncoder;
