//! Request handler abstraction.
//!
//! A [`Handler`] receives a fully received request and produces an [`Outcome`]: the response
//! to send, plus an optional error that is reported after the response went out. Returning
//! `Err` from [`Handler::call`] means no response at all, the connection is dropped.

use std::error::Error;
use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;

/// The result of handling one request.
pub struct Outcome {
    pub response: Response<Full<Bytes>>,
    pub error: Option<Box<dyn Error + Send + Sync>>,
}

impl Outcome {
    /// A response with nothing to report.
    pub fn ok(response: Response<Full<Bytes>>) -> Self {
        Self { response, error: None }
    }

    /// A response that was produced for a failure; the failure is logged once the response is sent.
    pub fn with_error<E: Into<Box<dyn Error + Send + Sync>>>(response: Response<Full<Bytes>>, error: E) -> Self {
        Self { response, error: Some(error.into()) }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("status", &self.response.status())
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .finish()
    }
}

#[async_trait]
pub trait Handler: Send + Sync {
    type Error: Into<Box<dyn Error + Send + Sync>>;

    async fn call(&self, req: Request<Bytes>) -> Result<Outcome, Self::Error>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<Err, F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request<Bytes>) -> Fut + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>>,
    Fut: Future<Output = Result<Outcome, Err>> + Send,
{
    type Error = Err;

    async fn call(&self, req: Request<Bytes>) -> Result<Outcome, Self::Error> {
        (self.f)(req).await
    }
}

pub fn make_handler<F, Err, Ret>(f: F) -> HandlerFn<F>
where
    Err: Into<Box<dyn Error + Send + Sync>>,
    Ret: Future<Output = Result<Outcome, Err>>,
    F: Fn(Request<Bytes>) -> Ret,
{
    HandlerFn { f }
}
