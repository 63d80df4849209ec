//! The provider contract shared by every identity provider.

use async_trait::async_trait;
use axum::http::{header, request::Parts};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::error::LoginError;

/// Query parameters a provider sends back to the callback URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange.
    #[serde(default)]
    pub code: Option<String>,
    /// Echoed CSRF state.
    #[serde(default)]
    pub state: Option<String>,
    /// Set instead of `code` when the user declined or the provider failed.
    #[serde(default)]
    pub error: Option<String>,
}

/// An OAuth2 identity provider that can vouch for a user's e-mail address.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Short lowercase name, also the last segment of the callback path.
    fn name(&self) -> &'static str;

    /// Builds the provider's authorization URL.
    ///
    /// Providers that bind the redirect to its callback add a state cookie to
    /// the returned jar, so the jar must be sent with the response that
    /// carries the URL.
    fn login_url(&self, jar: CookieJar) -> (CookieJar, String);

    /// Builds a best-effort provider-side logout link.
    fn logout_url(&self, request: &Parts) -> String;

    /// Validates the callback and exchanges its code for the user's e-mail.
    async fn callback_to_email(
        &self,
        query: &CallbackQuery,
        jar: &CookieJar,
    ) -> Result<String, LoginError>;

    /// Cookie cleanup once a login has succeeded.
    fn finish_login(&self, jar: CookieJar) -> CookieJar {
        jar
    }
}

/// Rebuilds an absolute URL on the request's host for `path`.
///
/// The scheme comes from the request URI when it is absolute and defaults to
/// `https`; the host comes from the URI authority or the `Host` header.
#[must_use]
pub fn absolute_url(request: &Parts, path: &str) -> String {
    let scheme = request.uri.scheme_str().unwrap_or("https");
    let host = request
        .uri
        .authority()
        .map(|a| a.as_str().to_string())
        .or_else(|| {
            request
                .headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_default();
    format!("{scheme}://{host}{path}")
}
