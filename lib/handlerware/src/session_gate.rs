//! The session gate.
//!
//! Every request through the gate leaves a breadcrumb trail: one `C:<name>`
//! crumb per request cookie, then the crumbs recorded while decoding the
//! session cookie (or `NoSerfrCookie` when there is none). The trail is
//! logged and written back as a year-long cookie named after the session
//! cookie with a `crumbs` suffix.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::Request,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use oauthgate_session::SessionCodec;
use time::Duration as TimeDuration;

use crate::chain::{Flow, Handler, Interceptor, call_within_deadline};
use crate::context::RequestContext;

/// How long the breadcrumb cookie lives.
pub const CRUMBS_MAX_AGE: TimeDuration = TimeDuration::days(365);

/// Continues only for requests carrying a valid, non-empty session.
///
/// Requests without one go to the fallback handler, which is typically a
/// landing page with login links.
#[derive(Clone)]
pub struct SessionGate {
    codec: Arc<SessionCodec>,
    crumbs_cookie: String,
    fallback: Option<Arc<dyn Handler>>,
}

impl SessionGate {
    pub fn new(codec: Arc<SessionCodec>) -> Self {
        let crumbs_cookie = codec.crumbs_cookie_name();
        Self {
            codec,
            crumbs_cookie,
            fallback: None,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Handler + 'static) -> Self {
        self.fallback = Some(Arc::new(fallback));
        self
    }

}

#[async_trait]
impl Interceptor for SessionGate {
    async fn intercept(&self, mut ctx: RequestContext, req: Request) -> Flow {
        let jar = CookieJar::from_headers(req.headers());

        for cookie in jar.iter() {
            ctx.crumbs.add(format!("C:{}", cookie.name()));
        }
        if let Some(incoming) = jar.get(&self.crumbs_cookie) {
            tracing::info!(cookie = %self.crumbs_cookie, trail = incoming.value(), "crumbs in");
        }

        let session = if self.codec.has_cookie(&jar) {
            match self.codec.decode(&jar, &mut ctx.crumbs) {
                Ok(session) if !session.is_empty() => Some(session),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!(error = %e, "session cookie rejected");
                    None
                }
            }
        } else {
            ctx.crumbs.add("NoSerfrCookie");
            None
        };

        tracing::info!(cookie = %self.crumbs_cookie, trail = %ctx.crumbs, "crumbs out");
        let crumbs_cookie = Cookie::build((self.crumbs_cookie.clone(), ctx.crumbs.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(CRUMBS_MAX_AGE);
        ctx.cookies = ctx.cookies.add(crumbs_cookie);

        if let Some(session) = session {
            ctx.session = Some(session);
            return Flow::Continue(ctx, req);
        }

        let Some(fallback) = &self.fallback else {
            let body = format!("no session, no fallback handler ({})", req.uri());
            tracing::warn!(uri = %req.uri(), "no session and no fallback handler");
            return Flow::Halt(
                ctx,
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response(),
            );
        };

        let response = call_within_deadline(fallback.as_ref(), ctx.clone(), req).await;
        Flow::Halt(ctx, response)
    }
}
