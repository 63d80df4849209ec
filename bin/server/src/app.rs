//! Application state and router.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, get_service},
};
use axum_extra::extract::cookie::CookieJar;
use oauthgate_core::Result;
use oauthgate_handlerware::{SessionChains, found};
use oauthgate_login::{FacebookProvider, GoogleProvider, OAuthProvider, callback_url};
use oauthgate_session::SessionCodec;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::dispatcher::{LoginHooks, SessionLoginCallback, make_callback_handler};
use crate::error::StartupError;
use crate::pages::{self, LandingPage};

/// Everything the routes share. Built once at startup and read-only after.
pub struct AppState {
    pub codec: Arc<SessionCodec>,
    pub chains: SessionChains,
    pub google: Arc<GoogleProvider>,
    pub facebook: Arc<FacebookProvider>,
    pub login_stem: String,
    pub hooks: LoginHooks,
}

impl AppState {
    /// Builds the codec, providers and gates from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the session keys are too short or a provider URL
    /// is invalid.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StartupError> {
        let component = |component: &'static str| {
            move |e: rootcause::Report<oauthgate_core::ConfigError>| StartupError::Component {
                component,
                details: e.to_string(),
            }
        };

        let codec = Arc::new(SessionCodec::new(&config.sessions).map_err(component("session codec"))?);

        let stem = &config.login.redirect_url_stem;
        let google = GoogleProvider::new(&config.google, &callback_url(&config.host, stem, "google"))
            .map_err(component("google provider"))?
            .with_secure_cookies(config.sessions.secure_cookies());
        let facebook =
            FacebookProvider::new(&config.facebook, &callback_url(&config.host, stem, "facebook"))
                .map_err(component("facebook provider"))?;

        let admins = config.users.admins();
        tracing::info!(admins = admins.len(), require_tls = config.require_tls, "gates configured");

        let chains = SessionChains::new(Arc::clone(&codec), Arc::new(admins))
            .with_timeout(config.request_timeout())
            .with_require_tls(config.require_tls);
        let hooks = LoginHooks::new(config.login.after_login_url.clone())
            .on_success(Arc::new(SessionLoginCallback::new(Arc::clone(&codec))));

        Ok(Self {
            codec,
            chains,
            google: Arc::new(google),
            facebook: Arc::new(facebook),
            login_stem: format!("/{}", stem.trim_matches('/')),
            hooks,
        })
    }

    fn providers(&self) -> [Arc<dyn OAuthProvider>; 2] {
        [
            Arc::clone(&self.google) as Arc<dyn OAuthProvider>,
            Arc::clone(&self.facebook) as Arc<dyn OAuthProvider>,
        ]
    }
}

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let landing = LandingPage::new(Arc::clone(&state.google), Arc::clone(&state.facebook));

    let mut router = Router::new()
        .route("/", get_service(state.chains.with_session(pages::home, landing)))
        .route("/admin", get_service(state.chains.with_admin(pages::admin)))
        .route("/logout", get(logout))
        .route("/health", get(health));

    for provider in state.providers() {
        let path = format!("{}/{}", state.login_stem, provider.name());
        tracing::debug!(%path, "registering login callback");
        router = router.route(&path, make_callback_handler(provider, state.hooks.clone()));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    (state.codec.invalidate(jar), found("/")).into_response()
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use oauthgate_session::Session;
    use tower::ServiceExt;

    const CONFIG: &str = r#"
        host = "https://stop.example.net"

        [google]
        client_id = "g-id"
        client_secret = "g-secret"

        [facebook]
        client_id = "fb-id"
        client_secret = "fb-secret"

        [sessions]
        key = "an-obviously-fake-test-key-of-at-least-32-bytes"
        secure_cookies = false

        [users]
        admin = "boss@example.com"
    "#;

    fn state_with(extra: &str) -> Arc<AppState> {
        let config = crate::config::from_toml(&format!("{extra}\n{CONFIG}"));
        Arc::new(AppState::from_config(&config).expect("valid state"))
    }

    fn session_cookie(state: &AppState, email: &str) -> String {
        let jar = state.codec.create(CookieJar::new(), &Session::for_email(email));
        let cookie = jar.get(state.codec.cookie_name()).expect("session cookie");
        cookie.encoded().stripped().to_string()
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .uri(uri)
            .header(header::HOST, "stop.example.net");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).expect("request")
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    fn set_cookie_names(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split('=').next())
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn anonymous_root_shows_landing_page_with_login_links() {
        let router = build_router(state_with(""));
        let response = router.oneshot(get_request("/", None)).await.expect("infallible");

        assert_eq!(response.status(), StatusCode::OK);
        let cookies = set_cookie_names(&response);
        assert!(cookies.contains(&"oauthstate".to_string()));
        assert!(cookies.contains(&"serfr0crumbs".to_string()));

        let body = body_text(response).await;
        assert!(body.contains("https://accounts.google.com/o/oauth2/auth?"));
        assert!(body.contains("https://www.facebook.com/v3.2/dialog/oauth?"));
        assert!(body.contains("https://www.google.com/accounts/Logout?continue="));
    }

    #[tokio::test]
    async fn signed_in_root_shows_home() {
        let state = state_with("");
        let cookie = session_cookie(&state, "a@b.com");
        let response = build_router(state)
            .oneshot(get_request("/", Some(&cookie)))
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("a@b.com"));
    }

    #[tokio::test]
    async fn admin_requires_allow_listed_session() {
        let state = state_with("");
        let user = session_cookie(&state, "a@b.com");
        let boss = session_cookie(&state, "Boss@Example.com");
        let router = build_router(state);

        let response = router
            .clone()
            .oneshot(get_request("/admin", None))
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .clone()
            .oneshot(get_request("/admin", Some(&user)))
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .oneshot(get_request("/admin", Some(&boss)))
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn logout_overwrites_session_and_redirects_home() {
        let response = build_router(state_with(""))
            .oneshot(get_request("/logout", None))
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert_eq!(set_cookie_names(&response), vec!["serfr0".to_string()]);
    }

    #[tokio::test]
    async fn google_callback_without_state_cookie_is_rejected() {
        let response = build_router(state_with(""))
            .oneshot(get_request("/login/google?code=abc&state=xyz", None))
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(set_cookie_names(&response).is_empty());
        assert!(body_text(response).await.contains("oauthstate"));
    }

    #[tokio::test]
    async fn plain_http_is_redirected_when_tls_required() {
        let response = build_router(state_with("require_tls = true"))
            .oneshot(
                Request::builder()
                    .uri("/admin")
                    .header(header::HOST, "stop.example.net")
                    .header("x-forwarded-proto", "http")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://stop.example.net/admin"
        );
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = build_router(state_with(""))
            .oneshot(get_request("/health", None))
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
