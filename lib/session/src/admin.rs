//! Flat admin e-mail allow-list.

use std::collections::HashSet;

/// Set of lower-cased admin e-mail addresses.
///
/// Built once at bootstrap from configuration and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowList {
    emails: HashSet<String>,
}

impl AdminAllowList {
    /// Builds the list from a comma-separated string, as found in config.
    ///
    /// Entries are trimmed and lower-cased; blank entries are skipped.
    #[must_use]
    pub fn from_csv(csv: &str) -> Self {
        Self::from_emails(csv.split(','))
    }

    /// Builds the list from individual addresses.
    pub fn from_emails<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    /// Returns true if `email` is an admin, ignoring case.
    #[must_use]
    pub fn is_admin(&self, email: &str) -> bool {
        self.emails.contains(&email.trim().to_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}
