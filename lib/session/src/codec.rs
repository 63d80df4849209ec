//! Sealing sessions into cookies and opening them again.
//!
//! The payload is a small JSON document (`email`, `tstamp`) encoded as
//! base64url and then signed or encrypted by the `cookie` crate. Opening tries
//! the current key first and the previous key second.

use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, SecondsFormat, Utc};
use cookie::{Cookie, Key, SameSite};
use oauthgate_core::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use time::Duration as TimeDuration;

use crate::config::SessionConfig;
use crate::crumbs::CrumbTrail;
use crate::error::SessionError;
use crate::session::{Session, format_age};

/// Session cookies live for roughly six months.
pub const SESSION_MAX_AGE: TimeDuration = TimeDuration::days(180);

/// Minimum key material accepted for deriving cookie keys.
pub const MIN_KEY_LEN: usize = 32;

/// How the cookie payload is protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// Authenticated but readable by the browser.
    Signed,
    /// Authenticated and encrypted.
    Private,
}

/// On-the-wire shape of the session payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredSession {
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) tstamp: Option<String>,
}

/// Reads and writes the session cookie.
pub struct SessionCodec {
    cookie_name: String,
    current: Key,
    previous: Option<Key>,
    protection: Protection,
    secure: bool,
}

impl SessionCodec {
    /// Creates a codec from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either key is shorter than [`MIN_KEY_LEN`] bytes.
    pub fn new(config: &SessionConfig) -> Result<Self, ConfigError> {
        let current = derive_key("sessions.key", config.key())?;
        let previous = config
            .prevkey()
            .map(|k| derive_key("sessions.prevkey", k))
            .transpose()?;
        let protection = if config.encrypt() {
            Protection::Private
        } else {
            Protection::Signed
        };

        tracing::debug!(
            cookie = config.cookie_name(),
            ?protection,
            rotation = previous.is_some(),
            "session codec initialised"
        );

        Ok(Self::from_keys(
            config.cookie_name(),
            current,
            previous,
            protection,
            config.secure_cookies(),
        ))
    }

    /// Creates a codec from already-built keys.
    #[must_use]
    pub fn from_keys(
        cookie_name: impl Into<String>,
        current: Key,
        previous: Option<Key>,
        protection: Protection,
        secure: bool,
    ) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            current,
            previous,
            protection,
            secure,
        }
    }

    /// Returns the session cookie name.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Returns the name of the breadcrumb cookie kept next to the session
    /// cookie.
    #[must_use]
    pub fn crumbs_cookie_name(&self) -> String {
        format!("{}crumbs", self.cookie_name)
    }

    /// Returns true if the request carries a session cookie at all.
    #[must_use]
    pub fn has_cookie(&self, jar: &CookieJar) -> bool {
        jar.get(&self.cookie_name).is_some()
    }

    /// Opens the session cookie in `jar`.
    ///
    /// A missing cookie, or one whose stored e-mail is absent, yields the
    /// empty session. Each step taken is recorded in `crumbs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie fails verification under both keys or
    /// its payload cannot be parsed.
    pub fn decode(
        &self,
        jar: &CookieJar,
        crumbs: &mut CrumbTrail,
    ) -> std::result::Result<Session, SessionError> {
        let Some(cookie) = jar.get(&self.cookie_name) else {
            crumbs.add("NewGSession");
            return Ok(Session::empty());
        };

        let Some(payload) = self.open(cookie.clone()) else {
            crumbs.add("GDecodeFailed");
            return Err(SessionError::Unverified {
                cookie: self.cookie_name.clone(),
            });
        };

        let stored = match decode_payload(&payload) {
            Ok(stored) => stored,
            Err(reason) => {
                crumbs.add("GDecodeFailed");
                return Err(SessionError::MalformedPayload {
                    cookie: self.cookie_name.clone(),
                    reason,
                });
            }
        };

        let Some(email) = stored.email.filter(|e| !e.is_empty()) else {
            crumbs.add("LoggedOutSession");
            return Ok(Session::empty());
        };

        crumbs.add("SessionRetrieved");

        let created_at = stored
            .tstamp
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let session = Session::new(email, created_at);
        crumbs.add(format!("Age:{}", format_age(session.age())));

        Ok(session)
    }

    /// Seals a fresh session for `session`'s e-mail into `jar`.
    ///
    /// The stored timestamp is the current time, not `session.created_at()`.
    #[must_use]
    pub fn create(&self, jar: CookieJar, session: &Session) -> CookieJar {
        let stored = StoredSession {
            email: Some(session.email().to_string()),
            tstamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        };
        tracing::info!(email = session.email(), "session created");
        self.add_sealed(jar, &stored)
    }

    /// Overwrites the session cookie with an empty payload.
    #[must_use]
    pub fn invalidate(&self, jar: CookieJar) -> CookieJar {
        tracing::info!("session overwritten to nil");
        self.add_sealed(jar, &StoredSession::default())
    }

    fn add_sealed(&self, jar: CookieJar, stored: &StoredSession) -> CookieJar {
        match self.seal(stored) {
            Some(cookie) => jar.add(cookie),
            None => {
                tracing::error!(cookie = %self.cookie_name, "failed to seal session cookie");
                jar
            }
        }
    }

    /// Signs or encrypts `stored` under the current key. The sealed cookie is
    /// the only change recorded in the scratch jar's delta.
    pub(crate) fn seal(&self, stored: &StoredSession) -> Option<Cookie<'static>> {
        let cookie = Cookie::build((self.cookie_name.clone(), encode_payload(stored)))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(SESSION_MAX_AGE)
            .build();

        let mut jar = cookie::CookieJar::new();
        match self.protection {
            Protection::Signed => jar.signed_mut(&self.current).add(cookie),
            Protection::Private => jar.private_mut(&self.current).add(cookie),
        }

        jar.delta().next().cloned()
    }

    fn open(&self, cookie: Cookie<'static>) -> Option<String> {
        let mut jar = cookie::CookieJar::new();
        jar.add_original(cookie);

        std::iter::once(&self.current)
            .chain(self.previous.as_ref())
            .find_map(|key| {
                let opened = match self.protection {
                    Protection::Signed => jar.signed(key).get(&self.cookie_name),
                    Protection::Private => jar.private(key).get(&self.cookie_name),
                };
                opened.map(|c| c.value().to_string())
            })
    }
}

fn derive_key(field: &str, material: &str) -> Result<Key, ConfigError> {
    if material.len() < MIN_KEY_LEN {
        return Err(ConfigError::new(
            field,
            format!(
                "must be at least {MIN_KEY_LEN} bytes, got {}",
                material.len()
            ),
        )
        .into());
    }
    Ok(Key::derive_from(material.as_bytes()))
}

fn encode_payload(stored: &StoredSession) -> String {
    // Serializing two optional strings cannot fail.
    let json = serde_json::to_vec(stored).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode_payload(value: &str) -> std::result::Result<StoredSession, String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| format!("bad base64: {e}"))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("bad json: {e}"))
}
