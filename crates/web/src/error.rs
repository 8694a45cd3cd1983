//! Error types of the dispatch layer.
//!
//! Every [`ApiError`] reaches the client the same way: `404 Not Found`, `text/plain`, the
//! error message as body. A [`DispatchError`] never reaches the client, the connection that
//! produced it is dropped.

use std::io;
use std::path::PathBuf;

use http::StatusCode;
use thiserror::Error;

use crate::reply::Reply;

/// A failure raised while a route handler runs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no route for {path}")]
    RouteNotFound { path: String },

    #[error("missing argument")]
    MissingArgument,

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("{}: {source}", path.display())]
    Fs { path: PathBuf, source: io::Error },

    #[error("can't run command: {source}")]
    Command { source: io::Error },

    #[error("can't encode response: {source}")]
    Encode {
        #[from]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn route_not_found<S: ToString>(path: S) -> Self {
        Self::RouteNotFound { path: path.to_string() }
    }

    pub fn invalid_argument<S: ToString>(reason: S) -> Self {
        Self::InvalidArgument { reason: reason.to_string() }
    }

    pub fn invalid_query<S: ToString>(reason: S) -> Self {
        Self::InvalidQuery { reason: reason.to_string() }
    }

    pub fn fs<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::Fs { path: path.into(), source }
    }

    /// The single response shape shared by all failures.
    pub fn to_reply(&self) -> Reply {
        Reply::text(StatusCode::NOT_FOUND, mime::TEXT_PLAIN, self.to_string())
    }
}

/// A request body that could not be decoded into an argument.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unsupported content type: {content_type:?}")]
    UnsupportedContentType { content_type: Option<String> },

    #[error("invalid json body: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid multipart body: {source}")]
    Multipart {
        #[from]
        source: MultipartError,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultipartError {
    #[error("missing boundary line")]
    MissingBoundary,

    #[error("part {index} has no header terminator")]
    MissingHeaderEnd { index: usize },

    #[error("part {index} is truncated")]
    Truncated { index: usize },

    #[error("form-data part {index} has no name")]
    MissingName { index: usize },

    #[error("form-data part {index} has a non utf-8 name")]
    InvalidName { index: usize },
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid route name `{name}`")]
    InvalidName { name: String },

    #[error("route `{name}` derives {path}, which is already registered")]
    Duplicate { name: String, path: String },

    #[error("can't insert route {path}: {source}")]
    Insert { path: String, source: matchit::InsertError },
}
