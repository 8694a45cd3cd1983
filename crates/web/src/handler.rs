use std::sync::Arc;

use async_trait::async_trait;

use crate::args::Args;
use crate::capability::Capabilities;
use crate::error::ApiError;
use crate::reply::Reply;

/// A route handler: one capability call behind an API path.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn invoke(&self, capabilities: Arc<dyn Capabilities>, args: Option<Args>) -> Result<Reply, ApiError>;
}

/// Holds an async fn as a [`RouteHandler`].
#[derive(Debug)]
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Arc<dyn Capabilities>, Option<Args>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, ApiError>> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> RouteHandler for FnHandler<F>
where
    F: Fn(Arc<dyn Capabilities>, Option<Args>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, ApiError>> + Send,
{
    async fn invoke(&self, capabilities: Arc<dyn Capabilities>, args: Option<Args>) -> Result<Reply, ApiError> {
        (self.f)(capabilities, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::MockCapabilities;
    use http::StatusCode;
    use serde_json::json;

    fn assert_is_handler<T: RouteHandler>(_handler: &T) {
        // no op
    }

    async fn echo(_caps: Arc<dyn Capabilities>, args: Option<Args>) -> Result<Reply, ApiError> {
        let value = args.ok_or(ApiError::MissingArgument)?.into_json()?;
        Ok(Reply::text(StatusCode::OK, mime::APPLICATION_JSON, value.to_string()))
    }

    #[tokio::test]
    async fn fn_is_route_handler() {
        let handler = handler_fn(echo);
        assert_is_handler(&handler);

        let caps: Arc<dyn Capabilities> = Arc::new(MockCapabilities::new());
        let reply = handler.invoke(Arc::clone(&caps), Some(Args::Json(json!([1])))).await.unwrap();
        assert_eq!(reply.body_bytes().as_ref(), b"[1]");

        assert!(matches!(handler.invoke(caps, None).await, Err(ApiError::MissingArgument)));
    }
}
