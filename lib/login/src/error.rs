//! Login callback errors.
//!
//! Every error is terminal for the callback request. None are retried; the
//! dispatcher reports them as a 500 carrying the error text.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

/// Errors from turning a provider callback into an e-mail address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// The CSRF state cookie was missing or did not match the `state` parameter.
    InvalidState {
        provider: &'static str,
        reason: String,
    },
    /// Exchanging the authorization code for an access token failed.
    ExchangeFailed {
        provider: &'static str,
        reason: String,
    },
    /// The user-info endpoint failed or answered with something other than 200.
    ProviderError {
        provider: &'static str,
        reason: String,
    },
    /// The user-info response had no string `email` claim.
    MissingEmailClaim {
        provider: &'static str,
        body: String,
    },
}

impl LoginError {
    /// Returns the provider that raised the error.
    #[must_use]
    pub fn provider(&self) -> &'static str {
        match self {
            Self::InvalidState { provider, .. }
            | Self::ExchangeFailed { provider, .. }
            | Self::ProviderError { provider, .. }
            | Self::MissingEmailClaim { provider, .. } => provider,
        }
    }
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidState { provider, reason } => {
                write!(f, "invalid oauth {provider} state: {reason}")
            }
            Self::ExchangeFailed { provider, reason } => {
                write!(f, "oauth {provider} code exchange failed: {reason}")
            }
            Self::ProviderError { provider, reason } => {
                write!(f, "oauth {provider} user info failed: {reason}")
            }
            Self::MissingEmailClaim { provider, body } => {
                write!(f, "oauth {provider} user info had no 'email' string: {body}")
            }
        }
    }
}

impl std::error::Error for LoginError {}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        tracing::warn!(provider = self.provider(), error = %self, "login callback failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
