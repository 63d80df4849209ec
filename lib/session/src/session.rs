//! The session record carried by the session cookie.

use chrono::{DateTime, Duration, Utc};

/// An authenticated browser.
///
/// A session is created after a successful OAuth2 exchange and records the
/// provider-asserted e-mail address together with the time of that exchange.
/// The default value, with an empty e-mail, means "no session".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Provider-asserted identity. Compared case-sensitively everywhere
    /// except the admin allow-list.
    email: String,
    /// When the OAuth2 exchange that produced this session happened.
    created_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session with an explicit creation time.
    #[must_use]
    pub fn new(email: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            created_at,
        }
    }

    /// Creates a session for `email`, stamped with the current time.
    #[must_use]
    pub fn for_email(email: impl Into<String>) -> Self {
        Self::new(email, Utc::now())
    }

    /// Returns the empty session.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the session's e-mail address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns when the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true if this session carries no identity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_empty()
    }

    /// Returns how long ago the session was created.
    #[must_use]
    pub fn age(&self) -> Duration {
        Utc::now() - self.created_at
    }
}

/// Formats a duration compactly, e.g. `2h5m3s`. Negative durations clamp to `0s`.
pub(crate) fn format_age(age: Duration) -> String {
    let total = age.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    match (hours, minutes) {
        (0, 0) => format!("{seconds}s"),
        (0, _) => format!("{minutes}m{seconds}s"),
        _ => format!("{hours}h{minutes}m{seconds}s"),
    }
}
