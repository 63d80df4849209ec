//! OAuth2 identity providers for oauthgate.
//!
//! Every provider implements the same three-step contract
//! ([`OAuthProvider`]): build a login URL, build a logout URL, and turn the
//! provider's callback request into the user's e-mail address.
//!
//! Two providers are supported:
//! - [`GoogleProvider`], which binds the login redirect to its callback with
//!   an `oauthstate` cookie
//! - [`FacebookProvider`], which sends a fixed state and trusts the callback
//!
//! Neither provider refreshes tokens; the access token is used once to read
//! the e-mail claim and then dropped.

pub mod config;
pub mod error;
pub mod facebook;
pub mod google;
pub mod provider;
pub mod state;

mod client;

pub use config::{ProviderConfig, callback_url};
pub use error::LoginError;
pub use facebook::FacebookProvider;
pub use google::GoogleProvider;
pub use provider::{CallbackQuery, OAuthProvider, absolute_url};
pub use state::OAUTH_STATE_COOKIE;
