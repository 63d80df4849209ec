//! Facebook login.
//!
//! Facebook logins carry a fixed `state` value and the callback does not
//! check it, so nothing binds a callback to the browser that started the
//! login.

use async_trait::async_trait;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use oauth2::{AuthType, CsrfToken};
use oauthgate_core::{ConfigError, Result};

use crate::client::{Endpoints, ProviderClient};
use crate::config::ProviderConfig;
use crate::error::LoginError;
use crate::provider::{CallbackQuery, OAuthProvider};

const FACEBOOK_ENDPOINTS: Endpoints = Endpoints {
    auth_url: "https://www.facebook.com/v3.2/dialog/oauth",
    token_url: "https://graph.facebook.com/v3.2/oauth/access_token",
    userinfo_url: "https://graph.facebook.com/me?fields=email",
};

const FACEBOOK_LOGOUT_URL: &str = "https://www.facebook.com/log.out#";

/// State sent on every Facebook login.
pub const FACEBOOK_FIXED_STATE: &str = "foo";

pub struct FacebookProvider {
    client: ProviderClient,
}

impl FacebookProvider {
    /// # Errors
    ///
    /// Returns an error if an endpoint or the callback URL is not a valid URL.
    pub fn new(config: &ProviderConfig, callback_url: &str) -> Result<Self, ConfigError> {
        let client = ProviderClient::new(
            "facebook",
            config,
            &FACEBOOK_ENDPOINTS,
            callback_url,
            &["email"],
            AuthType::RequestBody,
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl OAuthProvider for FacebookProvider {
    fn name(&self) -> &'static str {
        "facebook"
    }

    fn login_url(&self, jar: CookieJar) -> (CookieJar, String) {
        let url = self
            .client
            .authorize_url(CsrfToken::new(FACEBOOK_FIXED_STATE.to_string()));
        (jar, url)
    }

    fn logout_url(&self, _request: &Parts) -> String {
        FACEBOOK_LOGOUT_URL.to_string()
    }

    async fn callback_to_email(
        &self,
        query: &CallbackQuery,
        _jar: &CookieJar,
    ) -> std::result::Result<String, LoginError> {
        self.client
            .code_to_email(query.code.as_deref(), query.error.as_deref())
            .await
    }
}
