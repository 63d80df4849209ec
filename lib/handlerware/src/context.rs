//! Per-request state threaded through a [`Chain`](crate::Chain).

use axum_extra::extract::cookie::CookieJar;
use oauthgate_session::{CrumbTrail, Session};
use tokio::time::Instant;

/// State built up by interceptors and handed to the terminal handler.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Instant after which the handler's response is abandoned.
    pub deadline: Option<Instant>,
    /// The decoded session, set by [`SessionGate`](crate::SessionGate)
    /// only when it is non-empty.
    pub session: Option<Session>,
    /// Breadcrumbs recorded so far.
    pub crumbs: CrumbTrail,
    /// Cookies to attach to the response.
    pub cookies: CookieJar,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session's e-mail address, if there is a session.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.session.as_ref().map(Session::email)
    }
}
