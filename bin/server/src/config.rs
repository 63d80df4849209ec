//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server, loaded
//! via the `config` crate from an optional secrets file overlaid by
//! environment variables.
//!
//! The secrets file defaults to `secrets.toml` and can be moved with
//! `OAUTHGATE_SECRETS`. Environment variables use the `OAUTHGATE_` prefix
//! and `__` between levels, e.g. `OAUTHGATE_SESSIONS__KEY`.
//!
//! See [`SessionConfig`](oauthgate_session::SessionConfig) and
//! [`ProviderConfig`](oauthgate_login::ProviderConfig) for the library
//! sections.

use oauthgate_login::ProviderConfig;
use oauthgate_session::{AdminAllowList, SessionConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the secrets file.
pub const SECRETS_PATH_ENV: &str = "OAUTHGATE_SECRETS";

const DEFAULT_SECRETS_PATH: &str = "secrets.toml";
const ENV_PREFIX: &str = "OAUTHGATE";

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// External base URL of this site, used to build provider callback URLs.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default)]
    pub login: LoginConfig,

    /// Google OAuth2 client.
    #[serde(default)]
    pub google: ProviderConfig,

    /// Facebook OAuth2 client.
    #[serde(default)]
    pub facebook: ProviderConfig,

    /// Session cookie configuration.
    pub sessions: SessionConfig,

    #[serde(default)]
    pub users: UsersConfig,

    /// Redirect plain-HTTP requests for gated pages to HTTPS.
    #[serde(default)]
    pub require_tls: bool,

    /// Upper bound on a gated handler's run time.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

/// Where the login callbacks live and where a successful login lands.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginConfig {
    /// Path prefix of the callback routes; `/login` gives `/login/google`.
    #[serde(default = "default_redirect_url_stem")]
    pub redirect_url_stem: String,

    /// Relative URL a successful login redirects to; the e-mail is appended
    /// as the fragment.
    #[serde(default = "default_after_login_url")]
    pub after_login_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersConfig {
    /// Comma-separated admin e-mail addresses.
    #[serde(default)]
    pub admin: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_host() -> String {
    "http://localhost:8080".to_string()
}

fn default_redirect_url_stem() -> String {
    "/login".to_string()
}

fn default_after_login_url() -> String {
    "/".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    550
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            redirect_url_stem: default_redirect_url_stem(),
            after_login_url: default_after_login_url(),
        }
    }
}

impl UsersConfig {
    #[must_use]
    pub fn admins(&self) -> AdminAllowList {
        AdminAllowList::from_csv(&self.admin)
    }
}

impl ServerConfig {
    /// Loads configuration from the secrets file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var_os(SECRETS_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_SECRETS_PATH), PathBuf::from);
        Self::from_file(&path)
    }

    /// Loads configuration from `path`, which may be absent, overlaid by
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed or required configuration
    /// is missing.
    pub fn from_file(path: &Path) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[cfg(test)]
pub(crate) fn from_toml(toml: &str) -> ServerConfig {
    config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()
        .and_then(|c| c.try_deserialize())
        .expect("valid test configuration")
}
