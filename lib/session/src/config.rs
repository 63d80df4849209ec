//! Session cookie configuration.

use serde::Deserialize;
use std::fmt;

/// Default name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "serfr0";

/// Configuration for the session cookie and its keys.
///
/// `key` signs (or encrypts) new cookies. `prevkey`, when set, is still
/// accepted when opening cookies so that rotating the key does not log
/// everybody out.
#[derive(Clone, Deserialize)]
pub struct SessionConfig {
    /// Current key material. At least 32 bytes.
    key: String,
    /// Previous key material, accepted for verification only.
    #[serde(default)]
    prevkey: Option<String>,
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    cookie_name: String,
    /// Encrypt the cookie payload instead of only signing it.
    #[serde(default)]
    encrypt: bool,
    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    secure_cookies: bool,
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_secure_cookies() -> bool {
    true
}

impl SessionConfig {
    /// Creates a configuration with the given key and defaults elsewhere.
    #[must_use]
    pub fn new(key: String) -> Self {
        Self {
            key,
            prevkey: None,
            cookie_name: default_cookie_name(),
            encrypt: false,
            secure_cookies: default_secure_cookies(),
        }
    }

    /// Sets the previous key.
    #[must_use]
    pub fn with_prevkey(mut self, prevkey: impl Into<String>) -> Self {
        self.prevkey = Some(prevkey.into());
        self
    }

    /// Enables or disables payload encryption.
    #[must_use]
    pub fn with_encryption(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    /// Enables or disables the Secure cookie flag.
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the previous key, treating an empty value as unset.
    #[must_use]
    pub fn prevkey(&self) -> Option<&str> {
        self.prevkey.as_deref().filter(|k| !k.is_empty())
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    #[must_use]
    pub fn encrypt(&self) -> bool {
        self.encrypt
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

// Keys stay out of logs.
impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .field(
                "prevkey",
                &self.prevkey().map(|k| format!("<{} bytes>", k.len())),
            )
            .field("cookie_name", &self.cookie_name)
            .field("encrypt", &self.encrypt)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}
