//! Ready-made chains for the common route shapes.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use oauthgate_session::{AdminAllowList, SessionCodec};

use crate::admin_gate::AdminGate;
use crate::chain::{Chain, Handler};
use crate::context::RequestContext;
use crate::deadline::{DEFAULT_REQUEST_TIMEOUT, DeadlineInterceptor};
use crate::session_gate::SessionGate;
use crate::tls::RequireTls;

/// Body of the 401 sent to admin URLs when nobody is signed in.
pub const LOGIN_REQUIRED: &str = "This URL requires you to be logged in";

/// Shared pieces for building gated routes.
#[derive(Clone)]
pub struct SessionChains {
    codec: Arc<SessionCodec>,
    admins: Arc<AdminAllowList>,
    timeout: Duration,
    require_tls: bool,
}

impl SessionChains {
    pub fn new(codec: Arc<SessionCodec>, admins: Arc<AdminAllowList>) -> Self {
        Self {
            codec,
            admins,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            require_tls: false,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Makes every chain built by [`with_session`](Self::with_session) and
    /// [`with_admin`](Self::with_admin) redirect plain HTTP to HTTPS.
    #[must_use]
    pub fn with_require_tls(mut self, require_tls: bool) -> Self {
        self.require_tls = require_tls;
        self
    }

    fn outer(&self, handler: Arc<dyn Handler>, tls: bool) -> Chain {
        let chain = Chain::from_arc(handler).with(DeadlineInterceptor::new(self.timeout));
        if tls { chain.with(RequireTls) } else { chain }
    }

    /// Deadline, then session gate; `fallback` serves requests without a session.
    pub fn with_session(
        &self,
        handler: impl Handler + 'static,
        fallback: impl Handler + 'static,
    ) -> Chain {
        self.outer(Arc::new(handler), self.require_tls)
            .with(SessionGate::new(Arc::clone(&self.codec)).with_fallback(fallback))
    }

    /// Like [`with_session`](Self::with_session) but always requiring TLS.
    pub fn with_tls_session(
        &self,
        handler: impl Handler + 'static,
        fallback: impl Handler + 'static,
    ) -> Chain {
        self.outer(Arc::new(handler), true)
            .with(SessionGate::new(Arc::clone(&self.codec)).with_fallback(fallback))
    }

    /// Session gate with a 401 fallback, then the admin gate.
    pub fn with_admin(&self, handler: impl Handler + 'static) -> Chain {
        self.outer(Arc::new(handler), self.require_tls)
            .with(SessionGate::new(Arc::clone(&self.codec)).with_fallback(login_required))
            .with(AdminGate::new(Arc::clone(&self.admins)))
    }
}

async fn login_required(_ctx: RequestContext, _req: Request) -> Response {
    (StatusCode::UNAUTHORIZED, LOGIN_REQUIRED).into_response()
}
