//! OAuth2 plumbing shared by the providers: the configured `oauth2` client,
//! the outbound HTTP client, and the user-info lookup.

use std::time::Duration;

use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, RedirectUrl, Scope, TokenResponse, TokenUrl, basic::BasicClient,
};
use oauthgate_core::{ConfigError, Result};
use reqwest::StatusCode;

use crate::config::ProviderConfig;
use crate::error::LoginError;

/// Upper bound on any single call to a provider.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// A `BasicClient` with its authorization and token endpoints set.
type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Default endpoints for a provider.
pub(crate) struct Endpoints {
    pub(crate) auth_url: &'static str,
    pub(crate) token_url: &'static str,
    pub(crate) userinfo_url: &'static str,
}

pub(crate) struct ProviderClient {
    provider: &'static str,
    oauth: ConfiguredClient,
    http: reqwest::Client,
    userinfo_url: String,
    scopes: Vec<Scope>,
}

impl ProviderClient {
    pub(crate) fn new(
        provider: &'static str,
        config: &ProviderConfig,
        defaults: &Endpoints,
        callback_url: &str,
        scopes: &[&str],
        auth_type: AuthType,
    ) -> Result<Self, ConfigError> {
        let invalid = |field: &str, e: &dyn std::fmt::Display| {
            ConfigError::new(format!("{provider}.{field}"), e.to_string())
        };

        let auth_url = AuthUrl::new(config.auth_url_or(defaults.auth_url).to_string())
            .map_err(|e| invalid("auth_url", &e))?;
        let token_url = TokenUrl::new(config.token_url_or(defaults.token_url).to_string())
            .map_err(|e| invalid("token_url", &e))?;
        let redirect_url =
            RedirectUrl::new(callback_url.to_string()).map_err(|e| invalid("callback_url", &e))?;

        let oauth = BasicClient::new(ClientId::new(config.client_id().to_string()))
            .set_client_secret(ClientSecret::new(config.client_secret().to_string()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url)
            .set_auth_type(auth_type);

        // Token exchange must not follow redirects.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|e| invalid("http_client", &e))?;

        Ok(Self {
            provider,
            oauth,
            http,
            userinfo_url: config.userinfo_url_or(defaults.userinfo_url).to_string(),
            scopes: scopes.iter().map(|s| Scope::new((*s).to_string())).collect(),
        })
    }

    /// Builds the authorization URL carrying `state`.
    pub(crate) fn authorize_url(&self, state: CsrfToken) -> String {
        let (url, _) = self
            .oauth
            .authorize_url(move || state)
            .add_scopes(self.scopes.iter().cloned())
            .url();
        url.to_string()
    }

    /// Exchanges the callback's code and reads the e-mail claim.
    pub(crate) async fn code_to_email(
        &self,
        code: Option<&str>,
        provider_error: Option<&str>,
    ) -> std::result::Result<String, LoginError> {
        if let Some(error) = provider_error {
            return Err(LoginError::ExchangeFailed {
                provider: self.provider,
                reason: format!("provider returned error '{error}'"),
            });
        }
        let code = code.filter(|c| !c.is_empty()).ok_or(LoginError::ExchangeFailed {
            provider: self.provider,
            reason: "no code in callback".to_string(),
        })?;

        let access_token = self.exchange(code).await?;
        self.fetch_email(&access_token).await
    }

    async fn exchange(&self, code: &str) -> std::result::Result<String, LoginError> {
        let token = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| LoginError::ExchangeFailed {
                provider: self.provider,
                reason: e.to_string(),
            })?;

        tracing::debug!(provider = self.provider, "authorization code exchanged");
        Ok(token.access_token().secret().clone())
    }

    async fn fetch_email(&self, access_token: &str) -> std::result::Result<String, LoginError> {
        let provider_error = |reason: String| LoginError::ProviderError {
            provider: self.provider,
            reason,
        };

        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| provider_error(format!("request failed: {e}")))?;

        if response.status() != StatusCode::OK {
            return Err(provider_error(format!("bad HTTP status: {}", response.status())));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| provider_error(format!("bad JSON body: {e}")))?;

        email_claim(self.provider, &body)
    }
}

/// Extracts the `email` claim, which must be a string.
pub(crate) fn email_claim(
    provider: &'static str,
    body: &serde_json::Value,
) -> std::result::Result<String, LoginError> {
    body.get("email")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LoginError::MissingEmailClaim {
            provider,
            body: body.to_string(),
        })
}
