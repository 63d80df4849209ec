use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::Request, http::StatusCode, response::IntoResponse};
use oauthgate_session::AdminAllowList;

use crate::chain::{Flow, Interceptor};
use crate::context::RequestContext;

/// Body of the 401 sent to signed-in users who are not admins.
pub const ADMIN_REQUIRED: &str = "This URL requires admin access";

/// Lets through only sessions whose e-mail is on the allow-list.
///
/// Must run inside a [`SessionGate`](crate::SessionGate); a request with no
/// session in its context is refused like any non-admin.
#[derive(Debug, Clone)]
pub struct AdminGate {
    admins: Arc<AdminAllowList>,
}

impl AdminGate {
    #[must_use]
    pub fn new(admins: Arc<AdminAllowList>) -> Self {
        Self { admins }
    }
}

#[async_trait]
impl Interceptor for AdminGate {
    async fn intercept(&self, ctx: RequestContext, req: Request) -> Flow {
        if ctx.email().is_some_and(|email| self.admins.is_admin(email)) {
            return Flow::Continue(ctx, req);
        }
        tracing::info!(
            email = ctx.email().unwrap_or_default(),
            uri = %req.uri(),
            "admin access refused"
        );
        Flow::Halt(ctx, (StatusCode::UNAUTHORIZED, ADMIN_REQUIRED).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use oauthgate_session::Session;

    fn gate() -> AdminGate {
        AdminGate::new(Arc::new(AdminAllowList::from_csv("Boss@Example.com, ops@example.com")))
    }

    fn ctx_for(email: &str) -> RequestContext {
        RequestContext {
            session: Some(Session::for_email(email)),
            ..RequestContext::default()
        }
    }

    fn request() -> Request {
        axum::http::Request::builder()
            .uri("/admin")
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn admin_passes_case_insensitively() {
        let flow = gate().intercept(ctx_for("BOSS@example.COM"), request()).await;
        assert!(matches!(flow, Flow::Continue(..)));
    }

    #[tokio::test]
    async fn non_admin_is_unauthorized() {
        let Flow::Halt(_, response) = gate().intercept(ctx_for("a@b.com"), request()).await else {
            panic!("non-admin must be refused");
        };
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_session_is_unauthorized() {
        let flow = gate().intercept(RequestContext::new(), request()).await;
        assert!(matches!(flow, Flow::Halt(..)));
    }
}
