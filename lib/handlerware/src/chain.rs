//! The interceptor chain and its runner.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio::time::Instant;
use tower::Service;

use crate::context::RequestContext;

/// What an interceptor decided.
pub enum Flow {
    /// Pass the request to the next interceptor or the handler.
    Continue(RequestContext, Request),
    /// Stop here and send this response.
    Halt(RequestContext, Response),
}

/// One step of a [`Chain`].
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn intercept(&self, ctx: RequestContext, req: Request) -> Flow;
}

/// The terminal step of a [`Chain`], also used for fallbacks.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, ctx: RequestContext, req: Request) -> Response;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(RequestContext, Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    async fn call(&self, ctx: RequestContext, req: Request) -> Response {
        (self)(ctx, req).await
    }
}

/// Interceptors run in the order they were added, then the handler.
///
/// `Chain` is a `tower::Service`, so it mounts directly on an axum router
/// with `get_service` or `route_service`.
#[derive(Clone)]
pub struct Chain {
    interceptors: Vec<Arc<dyn Interceptor>>,
    handler: Arc<dyn Handler>,
}

impl Chain {
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self::from_arc(Arc::new(handler))
    }

    pub fn from_arc(handler: Arc<dyn Handler>) -> Self {
        Self {
            interceptors: Vec::new(),
            handler,
        }
    }

    /// Appends an interceptor inside the ones already added.
    #[must_use]
    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Runs `req` through the chain.
    ///
    /// The context's cookies are attached to the response whether an
    /// interceptor halted or the handler ran.
    pub async fn run(&self, req: Request) -> Response {
        let mut ctx = RequestContext::new();
        let mut req = req;

        for interceptor in &self.interceptors {
            match interceptor.intercept(ctx, req).await {
                Flow::Continue(next_ctx, next_req) => {
                    ctx = next_ctx;
                    req = next_req;
                }
                Flow::Halt(ctx, response) => return (ctx.cookies, response).into_response(),
            }
        }

        let cookies = ctx.cookies.clone();
        let response = call_within_deadline(self.handler.as_ref(), ctx, req).await;
        (cookies, response).into_response()
    }
}

/// Calls `handler`, abandoning it with a 504 once `ctx.deadline` passes.
pub(crate) async fn call_within_deadline(
    handler: &dyn Handler,
    ctx: RequestContext,
    req: Request,
) -> Response {
    let Some(deadline) = ctx.deadline else {
        return handler.call(ctx, req).await;
    };
    let uri = req.uri().clone();
    match tokio::time::timeout_at(deadline, handler.call(ctx, req)).await {
        Ok(response) => response,
        Err(_) => {
            let overrun = Instant::now().saturating_duration_since(deadline);
            tracing::warn!(%uri, ?overrun, "request deadline exceeded");
            (StatusCode::GATEWAY_TIMEOUT, "request deadline exceeded").into_response()
        }
    }
}

impl Service<Request> for Chain {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let chain = self.clone();
        Box::pin(async move { Ok(chain.run(req).await) })
    }
}
