//! Per-request breadcrumb trail.
//!
//! Crumbs record which branch of the session chain a request took. They are
//! written to a cookie and to the log so that lost-session reports can be
//! traced; nothing reads them to make a decision.

use std::fmt;

/// Ordered list of short diagnostic tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrumbTrail {
    crumbs: Vec<String>,
}

impl CrumbTrail {
    /// Creates an empty trail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tag.
    pub fn add(&mut self, crumb: impl Into<String>) {
        self.crumbs.push(crumb.into());
    }

    /// Returns true if `crumb` was recorded.
    #[must_use]
    pub fn contains(&self, crumb: &str) -> bool {
        self.crumbs.iter().any(|c| c == crumb)
    }

    /// Returns the recorded tags in order.
    #[must_use]
    pub fn crumbs(&self) -> &[String] {
        &self.crumbs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crumbs.is_empty()
    }
}

impl fmt::Display for CrumbTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.crumbs.join(","))
    }
}
