//! HTML pages served behind the session chain.
//!
//! Each page is a [`Handler`] so it can sit at the end of a chain or serve
//! as a fallback.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::Request,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use oauthgate_handlerware::{Handler, RequestContext};
use oauthgate_login::{FacebookProvider, GoogleProvider, OAuthProvider};

/// Shown to visitors without a session: one login link per provider, plus a
/// link that logs out of Google first so another account can be picked.
pub struct LandingPage {
    google: Arc<GoogleProvider>,
    facebook: Arc<FacebookProvider>,
}

impl LandingPage {
    pub fn new(google: Arc<GoogleProvider>, facebook: Arc<FacebookProvider>) -> Self {
        Self { google, facebook }
    }
}

#[async_trait]
impl Handler for LandingPage {
    async fn call(&self, _ctx: RequestContext, req: Request) -> Response {
        let (parts, _body) = req.into_parts();
        let (jar, google) = self.google.login_url(CookieJar::new());
        let (jar, facebook) = self.facebook.login_url(jar);
        let google_from_scratch = self.google.logout_url(&parts);

        let body = format!(
            "<html><body>\n\
             <h1>Please log in</h1>\n\
             <ul>\n\
             <li><a href=\"{}\">Log in with Google</a></li>\n\
             <li><a href=\"{}\">Log in with Google (switch account)</a></li>\n\
             <li><a href=\"{}\">Log in with Facebook</a></li>\n\
             </ul>\n\
             </body></html>\n",
            escape_attr(&google),
            escape_attr(&google_from_scratch),
            escape_attr(&facebook),
        );
        (jar, Html(body)).into_response()
    }
}

/// Home page for signed-in users.
pub async fn home(ctx: RequestContext, _req: Request) -> Response {
    let email = ctx.email().unwrap_or_default();
    Html(format!(
        "<html><body>\n\
         <p>Logged in as <b>{}</b>.</p>\n\
         <p><a href=\"/logout\">Log out</a></p>\n\
         </body></html>\n",
        escape_text(email)
    ))
    .into_response()
}

/// Admin landing page.
pub async fn admin(ctx: RequestContext, _req: Request) -> Response {
    let email = ctx.email().unwrap_or_default();
    let trail = ctx.crumbs.to_string();
    Html(format!(
        "<html><body>\n\
         <h1>Admin</h1>\n\
         <p>Signed in as <b>{}</b>.</p>\n\
         <p>Trail: <code>{}</code></p>\n\
         </body></html>\n",
        escape_text(email),
        escape_text(&trail)
    ))
    .into_response()
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
