//! Administrator allow-list
//!
//! The set of email addresses that are allowed through the admin gate,
//! supplied at startup so adding an administrator never needs a rebuild

use std::collections::HashSet;
use std::sync::Arc;

use crate::utils::env_var_or_else;

/// Emails of the accounts that may use the administrative API
///
/// Membership checks are case-insensitive
#[derive(Clone)]
pub struct AdminAllowList {
    emails: Arc<HashSet<String>>,
}

impl AdminAllowList {
    /// Load the allow-list from the `ADMIN_EMAILS` environment variable
    ///
    /// Comma-separated; an empty list is allowed but locks everybody out of
    /// the admin API
    pub fn from_env() -> Self {
        let emails = env_var_or_else("ADMIN_EMAILS", || {
            tracing::warn!("`ADMIN_EMAILS` is not set, all admin requests will be rejected");
            String::new()
        });

        Self::from_emails(emails.split(','))
    }

    /// Build an allow-list from a list of emails
    pub fn from_emails<I, E>(emails: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|email| email.as_ref().trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect::<HashSet<String>>();

        Self {
            emails: Arc::new(emails),
        }
    }

    /// Is the given email an administrator?
    pub fn is_admin(&self, email: &str) -> bool {
        self.emails.contains(&email.trim().to_lowercase())
    }
}
