//! Request dispatch.
//!
//! The [`Dispatcher`] is the transport [`Handler`] of the bridge. For each request it
//! decodes the argument, resolves the route, invokes the handler and turns the result into
//! an [`Outcome`]:
//!
//! - GET `/api/...`: argument from the `args` query key, or none without a query
//! - PUT `/api/...`: argument from the body, codec chosen by `Content-Type`
//! - GET `/@api.js`: the client script, read like `fs_readtext` but as `application/json`
//! - any other GET: a static file below the root directory
//! - anything else: `405 Method Not Allowed`
//!
//! Handler failures, query decoding failures and unknown API paths all answer 404 with the
//! failure message and carry the failure in [`Outcome::error`]. A PUT body that can't be
//! decoded is different: it fails before any handler runs, `call` returns the
//! [`DispatchError`] and the connection is dropped without a response.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bridge_http::handler::{Handler, Outcome};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, StatusCode};
use tracing::{debug, warn};

use crate::api;
use crate::args::Args;
use crate::capability::Capabilities;
use crate::codec;
use crate::error::{ApiError, DispatchError};
use crate::reply::Reply;
use crate::router::{RouteTable, is_api_path};
use crate::static_files::StaticFiles;

/// Virtual path of the generated client script.
pub const CLIENT_SCRIPT_PATH: &str = "/@api.js";

pub struct Dispatcher {
    routes: RouteTable,
    capabilities: Arc<dyn Capabilities>,
    static_files: StaticFiles,
    client_script: PathBuf,
}

impl Dispatcher {
    pub fn new(
        routes: RouteTable,
        capabilities: Arc<dyn Capabilities>,
        static_files: StaticFiles,
        client_script: PathBuf,
    ) -> Self {
        Self { routes, capabilities, static_files, client_script }
    }

    pub async fn dispatch(&self, request: Request<Bytes>) -> Result<Outcome, DispatchError> {
        let (parts, body) = request.into_parts();
        let path = parts.uri.path();
        debug!(method = %parts.method, path, "dispatch request");

        match parts.method {
            Method::GET if is_api_path(path) => {
                let args = codec::query::decode(parts.uri.query());
                Ok(self.invoke(path, args).await)
            }
            Method::GET if path == CLIENT_SCRIPT_PATH => {
                let script = self.client_script.to_string_lossy();
                let result = api::read_text_as(self.capabilities.as_ref(), &script, mime::APPLICATION_JSON).await;
                Ok(into_outcome(result))
            }
            Method::GET => Ok(Outcome::ok(self.static_files.serve(path).await.into_response())),
            Method::PUT if is_api_path(path) => {
                // decoded outside the handler wrapper, a failure aborts the connection
                let args = codec::decode_body(parts.headers.get(CONTENT_TYPE), &body)?;
                Ok(self.invoke(path, Ok(Some(args))).await)
            }
            method => {
                warn!(%method, path, "method not allowed");
                Ok(Outcome::ok(Reply::empty(StatusCode::METHOD_NOT_ALLOWED).into_response()))
            }
        }
    }

    async fn invoke(&self, path: &str, args: Result<Option<Args>, ApiError>) -> Outcome {
        let result = match self.routes.at(path) {
            None => Err(ApiError::route_not_found(path)),
            Some(handler) => match args {
                Ok(args) => handler.invoke(Arc::clone(&self.capabilities), args).await,
                Err(e) => Err(e),
            },
        };
        into_outcome(result)
    }
}

/// Every failure still produces a response; the failure itself travels along to be logged.
fn into_outcome(result: Result<Reply, ApiError>) -> Outcome {
    match result {
        Ok(reply) => Outcome::ok(reply.into_response()),
        Err(e) => Outcome::with_error(e.to_reply().into_response(), e),
    }
}

#[async_trait]
impl Handler for Dispatcher {
    type Error = DispatchError;

    async fn call(&self, req: Request<Bytes>) -> Result<Outcome, Self::Error> {
        self.dispatch(req).await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.routes)
            .field("static_files", &self.static_files)
            .field("client_script", &self.client_script)
            .finish_non_exhaustive()
    }
}
