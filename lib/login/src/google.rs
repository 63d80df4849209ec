//! Google login.
//!
//! The login URL is bound to its callback by the `oauthstate` cookie; a
//! callback whose `state` does not match the cookie is rejected before any
//! call to Google is made.

use async_trait::async_trait;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use oauth2::AuthType;
use oauth2::url::form_urlencoded;
use oauthgate_core::{ConfigError, Result};

use crate::client::{Endpoints, ProviderClient};
use crate::config::ProviderConfig;
use crate::error::LoginError;
use crate::provider::{CallbackQuery, OAuthProvider, absolute_url};
use crate::state;

/// Scope needed to read the user's e-mail address.
pub const GOOGLE_EMAIL_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

const GOOGLE_ENDPOINTS: Endpoints = Endpoints {
    auth_url: "https://accounts.google.com/o/oauth2/auth",
    token_url: "https://oauth2.googleapis.com/token",
    userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo",
};

const GOOGLE_LOGOUT_URL: &str = "https://www.google.com/accounts/Logout";
const APPENGINE_LOGOUT_URL: &str = "https://appengine.google.com/_ah/logout";

/// Google OAuth2 login.
pub struct GoogleProvider {
    client: ProviderClient,
    secure_cookies: bool,
}

impl GoogleProvider {
    /// Creates the provider; `callback_url` is where Google sends the user back.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint or the callback URL is not a valid URL.
    pub fn new(config: &ProviderConfig, callback_url: &str) -> Result<Self, ConfigError> {
        let client = ProviderClient::new(
            "google",
            config,
            &GOOGLE_ENDPOINTS,
            callback_url,
            &[GOOGLE_EMAIL_SCOPE],
            AuthType::RequestBody,
        )?;
        Ok(Self {
            client,
            secure_cookies: true,
        })
    }

    /// Sets the Secure flag on the state cookie. Defaults to true.
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn login_url(&self, jar: CookieJar) -> (CookieJar, String) {
        let (jar, token) = state::issue(jar, self.secure_cookies);
        (jar, self.client.authorize_url(token))
    }

    /// Logs the user out of Google entirely, then bounces back to this site.
    ///
    /// Google only redirects to its own hosts, so the user passes through an
    /// "are you sure" notice on the way back.
    fn logout_url(&self, request: &Parts) -> String {
        let home = absolute_url(request, "/");
        let inner = form_urlencoded::Serializer::new(String::new())
            .append_pair("continue", &home)
            .finish();
        let outer = form_urlencoded::Serializer::new(String::new())
            .append_pair("continue", &format!("{APPENGINE_LOGOUT_URL}?{inner}"))
            .finish();
        format!("{GOOGLE_LOGOUT_URL}?{outer}")
    }

    async fn callback_to_email(
        &self,
        query: &CallbackQuery,
        jar: &CookieJar,
    ) -> std::result::Result<String, LoginError> {
        state::verify(jar, query.state.as_deref()).map_err(|reason| {
            LoginError::InvalidState {
                provider: "google",
                reason,
            }
        })?;

        self.client
            .code_to_email(query.code.as_deref(), query.error.as_deref())
            .await
    }

    fn finish_login(&self, jar: CookieJar) -> CookieJar {
        state::clear(jar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::OAUTH_STATE_COOKIE;
    use axum::http::{Request, header};
    use axum_extra::extract::cookie::Cookie;
    use oauth2::url::Url;
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::matchers::{body_string_contains, header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CALLBACK: &str = "https://stop.example.net/login/google";

    fn provider(config: &ProviderConfig) -> GoogleProvider {
        GoogleProvider::new(config, CALLBACK).expect("valid config")
    }

    fn query_map(url: &str) -> HashMap<String, String> {
        Url::parse(url)
            .expect("absolute url")
            .query_pairs()
            .into_owned()
            .collect()
    }

    fn callback(code: &str, state: &str) -> CallbackQuery {
        CallbackQuery {
            code: Some(code.to_string()),
            state: Some(state.to_string()),
            error: None,
        }
    }

    fn jar_with_state(state: &str) -> CookieJar {
        CookieJar::new().add(Cookie::new(OAUTH_STATE_COOKIE, state.to_string()))
    }

    async fn mock_google(userinfo: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=good-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-123",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header_matcher("authorization", "Bearer access-123"))
            .respond_with(userinfo)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn login_url_carries_oauth_parameters_and_sets_state_cookie() {
        let google = provider(&ProviderConfig::new("app-id", "secret"));
        let (jar, url) = google.login_url(CookieJar::new());

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        let params = query_map(&url);
        assert_eq!(params["client_id"], "app-id");
        assert_eq!(params["redirect_uri"], CALLBACK);
        assert_eq!(params["scope"], GOOGLE_EMAIL_SCOPE);
        assert_eq!(params["response_type"], "code");

        let cookie = jar.get(OAUTH_STATE_COOKIE).expect("state cookie");
        assert_eq!(params["state"], cookie.value());
    }

    #[test]
    fn logout_url_bounces_back_to_site_root() {
        let google = provider(&ProviderConfig::new("app-id", "secret"));
        let request = Request::builder()
            .uri("/landing")
            .header(header::HOST, "stop.example.net")
            .body(())
            .expect("request")
            .into_parts()
            .0;

        let url = google.logout_url(&request);
        assert!(url.starts_with("https://www.google.com/accounts/Logout?continue="));
        let outer = query_map(&url);
        let inner = query_map(&outer["continue"]);
        assert!(outer["continue"].starts_with(APPENGINE_LOGOUT_URL));
        assert_eq!(inner["continue"], "https://stop.example.net/");
    }

    #[tokio::test]
    async fn callback_without_state_cookie_is_invalid_state() {
        let google = provider(&ProviderConfig::new("app-id", "secret"));
        let result = google
            .callback_to_email(&callback("good-code", "abc"), &CookieJar::new())
            .await;
        assert!(matches!(result, Err(LoginError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn callback_with_mismatched_state_is_invalid_state() {
        let google = provider(&ProviderConfig::new("app-id", "secret"));
        let result = google
            .callback_to_email(&callback("good-code", "abc"), &jar_with_state("xyz"))
            .await;
        assert!(matches!(result, Err(LoginError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn callback_exchanges_code_for_email() {
        let server =
            mock_google(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1",
                "email": "a@b.com",
                "verified_email": true
            })))
            .await;
        let google = provider(&ProviderConfig::new("app-id", "secret").with_endpoint_base(&server.uri()));

        let email = google
            .callback_to_email(&callback("good-code", "s1"), &jar_with_state("s1"))
            .await
            .expect("login succeeds");
        assert_eq!(email, "a@b.com");
    }

    #[tokio::test]
    async fn rejected_code_is_exchange_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant"
            })))
            .mount(&server)
            .await;
        let google = provider(&ProviderConfig::new("app-id", "secret").with_endpoint_base(&server.uri()));

        let result = google
            .callback_to_email(&callback("stale-code", "s1"), &jar_with_state("s1"))
            .await;
        assert!(matches!(result, Err(LoginError::ExchangeFailed { .. })));
    }

    #[tokio::test]
    async fn provider_error_param_is_exchange_failure() {
        let google = provider(&ProviderConfig::new("app-id", "secret"));
        let query = CallbackQuery {
            code: None,
            state: Some("s1".to_string()),
            error: Some("access_denied".to_string()),
        };
        let result = google.callback_to_email(&query, &jar_with_state("s1")).await;
        assert!(matches!(result, Err(LoginError::ExchangeFailed { .. })));
    }

    #[tokio::test]
    async fn non_200_user_info_is_provider_error() {
        let server = mock_google(ResponseTemplate::new(401)).await;
        let google = provider(&ProviderConfig::new("app-id", "secret").with_endpoint_base(&server.uri()));

        let result = google
            .callback_to_email(&callback("good-code", "s1"), &jar_with_state("s1"))
            .await;
        assert!(matches!(result, Err(LoginError::ProviderError { .. })));
    }

    #[tokio::test]
    async fn user_info_without_email_is_missing_claim() {
        let server =
            mock_google(ResponseTemplate::new(200).set_body_json(json!({"id": "1"}))).await;
        let google = provider(&ProviderConfig::new("app-id", "secret").with_endpoint_base(&server.uri()));

        let result = google
            .callback_to_email(&callback("good-code", "s1"), &jar_with_state("s1"))
            .await;
        assert!(matches!(result, Err(LoginError::MissingEmailClaim { .. })));
    }

    #[test]
    fn finish_login_clears_state_cookie() {
        let google = provider(&ProviderConfig::new("app-id", "secret"));
        let (jar, _) = google.login_url(CookieJar::new());
        let jar = google.finish_login(jar);
        assert!(jar.get(OAUTH_STATE_COOKIE).is_none());
    }

    #[test]
    fn invalid_callback_url_is_config_error() {
        assert!(GoogleProvider::new(&ProviderConfig::new("a", "b"), "not a url").is_err());
    }
}
