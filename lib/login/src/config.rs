//! Per-provider OAuth2 client configuration.

use serde::Deserialize;
use std::fmt;

/// Client credentials for one identity provider.
///
/// Missing credentials are not rejected here: the provider refuses them at
/// exchange time, which is where the error surfaces. The endpoint overrides
/// exist for staging providers and tests; production uses the defaults baked
/// into each provider.
#[derive(Clone, Default, Deserialize)]
pub struct ProviderConfig {
    /// The OAuth2 client (app) ID.
    #[serde(default)]
    client_id: String,
    /// The OAuth2 client secret.
    #[serde(default)]
    client_secret: String,
    /// Override for the authorization endpoint.
    #[serde(default)]
    auth_url: Option<String>,
    /// Override for the token endpoint.
    #[serde(default)]
    token_url: Option<String>,
    /// Override for the user-info endpoint.
    #[serde(default)]
    userinfo_url: Option<String>,
}

impl ProviderConfig {
    /// Creates a configuration using the provider's default endpoints.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Points every endpoint at `base`, as `<base>/auth`, `<base>/token`,
    /// and `<base>/userinfo`.
    #[must_use]
    pub fn with_endpoint_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.auth_url = Some(format!("{base}/auth"));
        self.token_url = Some(format!("{base}/token"));
        self.userinfo_url = Some(format!("{base}/userinfo"));
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub(crate) fn auth_url_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.auth_url.as_deref().unwrap_or(default)
    }

    pub(crate) fn token_url_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.token_url.as_deref().unwrap_or(default)
    }

    pub(crate) fn userinfo_url_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.userinfo_url.as_deref().unwrap_or(default)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .finish()
    }
}

/// Builds the absolute callback URL for `provider`, e.g.
/// `https://app.example.com/login/google`.
#[must_use]
pub fn callback_url(host: &str, stem: &str, provider: &str) -> String {
    format!(
        "{}/{}/{}",
        host.trim_end_matches('/'),
        stem.trim_matches('/'),
        provider
    )
}
