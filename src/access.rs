//! Admin allow-list checks for privileged operations.

use std::collections::HashSet;

use thiserror::Error;

use crate::domain::Email;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccessError {
    #[error("access denied for {0}")]
    Denied(Email),
    #[error("admin allow-list not configured")]
    NotConfigured,
}

/// Decides who may run privileged operations. An empty allow-list denies
/// everyone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessPolicy {
    admins: HashSet<Email>,
}

impl AccessPolicy {
    pub fn new(admins: impl IntoIterator<Item = Email>) -> Self {
        Self {
            admins: admins.into_iter().filter(|email| !email.is_empty()).collect(),
        }
    }

    /// Parses a comma-separated list such as `"a@x.com, B@x.com"`.
    pub fn from_allow_list(raw: &str) -> Self {
        Self::new(raw.split(',').map(Email::new))
    }

    pub fn is_configured(&self) -> bool {
        !self.admins.is_empty()
    }

    pub fn is_authorized(&self, email: &Email) -> bool {
        self.authorize(email).is_ok()
    }

    pub fn authorize(&self, email: &Email) -> Result<(), AccessError> {
        if !self.is_configured() {
            return Err(AccessError::NotConfigured);
        }
        if self.admins.contains(email) {
            Ok(())
        } else {
            Err(AccessError::Denied(email.clone()))
        }
    }
}
