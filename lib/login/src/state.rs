//! The `oauthstate` CSRF cookie.
//!
//! The state value is generated when the login URL is built, stored in a
//! short-lived cookie, and compared byte-for-byte with the `state` parameter
//! the provider echoes back. The cookie is cleared after a successful login
//! but nothing on the server remembers consumed values.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use oauth2::CsrfToken;
use time::Duration as TimeDuration;

/// Name of the CSRF state cookie.
pub const OAUTH_STATE_COOKIE: &str = "oauthstate";

/// How long a login redirect stays valid.
pub const OAUTH_STATE_MAX_AGE: TimeDuration = TimeDuration::minutes(20);

/// Generates a fresh state (16 random bytes, base64url) and stores it in `jar`.
pub(crate) fn issue(jar: CookieJar, secure: bool) -> (CookieJar, CsrfToken) {
    let token = CsrfToken::new_random();
    let cookie = Cookie::build((OAUTH_STATE_COOKIE, token.secret().clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(OAUTH_STATE_MAX_AGE);
    (jar.add(cookie), token)
}

/// Checks the echoed `state` against the cookie.
pub(crate) fn verify(jar: &CookieJar, echoed: Option<&str>) -> Result<(), String> {
    let Some(expected) = jar.get(OAUTH_STATE_COOKIE) else {
        return Err(format!("no {OAUTH_STATE_COOKIE} cookie"));
    };
    match echoed {
        Some(state) if state.as_bytes() == expected.value().as_bytes() => Ok(()),
        Some(_) => Err("state parameter does not match cookie".to_string()),
        None => Err("no state parameter".to_string()),
    }
}

/// Expires the state cookie on the browser.
pub(crate) fn clear(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(OAUTH_STATE_COOKIE).path("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_state_is_stored_in_cookie() {
        let (jar, token) = issue(CookieJar::new(), true);
        let cookie = jar.get(OAUTH_STATE_COOKIE).expect("state cookie");
        assert_eq!(cookie.value(), token.secret());
        assert_eq!(cookie.max_age(), Some(OAUTH_STATE_MAX_AGE));
        // 16 bytes of base64url without padding.
        assert_eq!(token.secret().len(), 22);
    }

    #[test]
    fn issued_states_differ() {
        let (_, a) = issue(CookieJar::new(), false);
        let (_, b) = issue(CookieJar::new(), false);
        assert_ne!(a.secret(), b.secret());
    }

    #[test]
    fn verify_accepts_matching_state() {
        let (jar, token) = issue(CookieJar::new(), false);
        assert!(verify(&jar, Some(token.secret())).is_ok());
    }

    #[test]
    fn verify_rejects_missing_cookie_mismatch_and_absent_state() {
        assert!(verify(&CookieJar::new(), Some("abc")).is_err());

        let (jar, _) = issue(CookieJar::new(), false);
        assert!(verify(&jar, Some("abc")).is_err());
        assert!(verify(&jar, None).is_err());
    }

    #[test]
    fn clear_removes_cookie() {
        let (jar, _) = issue(CookieJar::new(), false);
        let jar = clear(jar);
        assert!(jar.get(OAUTH_STATE_COOKIE).is_none());
    }
}
