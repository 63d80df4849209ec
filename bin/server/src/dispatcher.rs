//! Provider callback routes.
//!
//! One route per provider, at `<stem>/<provider name>`. The handler asks the
//! provider for the user's e-mail, lets the login hook act on it (normally:
//! create the session cookie), and redirects to the after-login URL with
//! the e-mail as the fragment.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Query, Request},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use axum_extra::extract::cookie::CookieJar;
use oauthgate_handlerware::found;
use oauthgate_login::{CallbackQuery, OAuthProvider};
use oauthgate_session::{Session, SessionCodec};

/// A login hook failed; the login is aborted with a 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginHookError {
    pub details: String,
}

impl fmt::Display for LoginHookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "login hook failed: {}", self.details)
    }
}

impl std::error::Error for LoginHookError {}

/// Called once a provider has vouched for `email`.
#[async_trait]
pub trait OnLoginSuccess: Send + Sync {
    async fn on_login(
        &self,
        jar: CookieJar,
        request: &Parts,
        email: &str,
    ) -> Result<CookieJar, LoginHookError>;
}

/// The default hook: start a session for the e-mail.
pub struct SessionLoginCallback {
    codec: Arc<SessionCodec>,
}

impl SessionLoginCallback {
    #[must_use]
    pub fn new(codec: Arc<SessionCodec>) -> Self {
        Self { codec }
    }
}

#[async_trait]
impl OnLoginSuccess for SessionLoginCallback {
    async fn on_login(
        &self,
        jar: CookieJar,
        _request: &Parts,
        email: &str,
    ) -> Result<CookieJar, LoginHookError> {
        Ok(self.codec.create(jar, &Session::for_email(email)))
    }
}

/// What happens after a provider callback succeeds.
#[derive(Clone)]
pub struct LoginHooks {
    after_login_url: String,
    on_success: Option<Arc<dyn OnLoginSuccess>>,
}

impl LoginHooks {
    pub fn new(after_login_url: impl Into<String>) -> Self {
        Self {
            after_login_url: after_login_url.into(),
            on_success: None,
        }
    }

    #[must_use]
    pub fn on_success(mut self, hook: Arc<dyn OnLoginSuccess>) -> Self {
        self.on_success = Some(hook);
        self
    }
}

/// Builds the callback route for `provider`.
pub fn make_callback_handler<S>(
    provider: Arc<dyn OAuthProvider>,
    hooks: LoginHooks,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    get(move |req: Request| async move { handle_callback(provider.as_ref(), &hooks, req).await })
}

async fn handle_callback(
    provider: &dyn OAuthProvider,
    hooks: &LoginHooks,
    req: Request,
) -> Response {
    let (parts, _body) = req.into_parts();
    let query = Query::<CallbackQuery>::try_from_uri(&parts.uri)
        .map(|Query(query)| query)
        .unwrap_or_default();
    let jar = CookieJar::from_headers(&parts.headers);

    let email = match provider.callback_to_email(&query, &jar).await {
        Ok(email) => email,
        Err(e) => return e.into_response(),
    };

    let mut jar = provider.finish_login(jar);
    if let Some(hook) = &hooks.on_success {
        jar = match hook.on_login(jar, &parts, &email).await {
            Ok(jar) => jar,
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "login hook failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
        };
    }

    tracing::info!(provider = provider.name(), %email, "login succeeded");
    (jar, found(&format!("{}#{email}", hooks.after_login_url))).into_response()
}
