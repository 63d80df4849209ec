use std::time::Duration;

use async_trait::async_trait;
use axum::extract::Request;
use tokio::time::Instant;

use crate::chain::{Flow, Interceptor};
use crate::context::RequestContext;

/// How long a gated handler may run before the request is abandoned.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(550);

/// Stamps the request with a deadline `timeout` from now.
///
/// An earlier deadline already in the context is kept.
#[derive(Debug, Clone, Copy)]
pub struct DeadlineInterceptor {
    timeout: Duration,
}

impl DeadlineInterceptor {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for DeadlineInterceptor {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl Interceptor for DeadlineInterceptor {
    async fn intercept(&self, mut ctx: RequestContext, req: Request) -> Flow {
        let deadline = Instant::now() + self.timeout;
        ctx.deadline = Some(ctx.deadline.map_or(deadline, |d| d.min(deadline)));
        Flow::Continue(ctx, req)
    }
}
