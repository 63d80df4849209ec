//! Core error handling shared by the oauthgate crates.
//!
//! Every crate defines its own domain errors; this crate carries the pieces
//! they all need at bootstrap time.

pub mod error;

pub use error::{ConfigError, Result};
