//! Cookie-held sessions for oauthgate.
//!
//! This crate provides:
//! - The `Session` record (an e-mail address and a creation timestamp)
//! - `SessionCodec`, which seals sessions into signed or encrypted cookies
//!   and opens them again, accepting a previous key during key rotation
//! - `CrumbTrail`, the per-request diagnostic breadcrumbs
//! - `AdminAllowList`, the flat admin e-mail list
//!
//! # Session model
//!
//! There is no server-side session table. The cookie is the session: it is
//! decoded fresh on every request, and a session whose e-mail is empty is
//! treated as "no session" rather than as an error.
//!
//! # Example
//!
//! ```
//! use axum_extra::extract::cookie::CookieJar;
//! use oauthgate_session::{CrumbTrail, Session, SessionCodec, SessionConfig};
//!
//! let config = SessionConfig::new("0123456789abcdef0123456789abcdef".to_string());
//! let codec = SessionCodec::new(&config).expect("valid key");
//!
//! let jar = codec.create(CookieJar::new(), &Session::for_email("alice@example.com"));
//!
//! let mut crumbs = CrumbTrail::new();
//! let session = codec.decode(&jar, &mut crumbs).expect("decodes");
//! assert_eq!(session.email(), "alice@example.com");
//! assert!(crumbs.contains("SessionRetrieved"));
//! ```

pub mod admin;
pub mod codec;
pub mod config;
pub mod crumbs;
pub mod error;
pub mod session;

pub use admin::AdminAllowList;
pub use codec::{Protection, SessionCodec};
pub use config::SessionConfig;
pub use crumbs::CrumbTrail;
pub use error::SessionError;
pub use session::Session;
