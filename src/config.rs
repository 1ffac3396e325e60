//! Runtime settings, read from the process environment (optionally seeded
//! from a `.env` file) or from any key lookup in tests.

use std::time::Duration;

use thiserror::Error;

use crate::access::AccessPolicy;
use crate::actor_framework::DEFAULT_TIMEOUT;

pub const ADMIN_EMAILS: &str = "ADMIN_EMAILS";
pub const STORE_TIMEOUT_MS: &str = "STOREFRONT_STORE_TIMEOUT_MS";
pub const CHANNEL_BUFFER: &str = "STOREFRONT_CHANNEL_BUFFER";
pub const LOG_FILTER: &str = "STOREFRONT_LOG";

const DEFAULT_CHANNEL_BUFFER: usize = 100;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontConfig {
    /// Comma-separated admin allow-list. Empty denies every privileged call.
    pub admin_emails: String,
    pub store_timeout: Duration,
    pub channel_buffer: usize,
    pub log_filter: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            admin_emails: String::new(),
            store_timeout: DEFAULT_TIMEOUT,
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl StorefrontConfig {
    pub fn with_admin_emails(mut self, admin_emails: impl Into<String>) -> Self {
        self.admin_emails = admin_emails.into();
        self
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub fn with_channel_buffer(mut self, channel_buffer: usize) -> Self {
        self.channel_buffer = channel_buffer;
        self
    }

    pub fn with_log_filter(mut self, log_filter: impl Into<String>) -> Self {
        self.log_filter = log_filter.into();
        self
    }

    /// Builds a config from `lookup`; missing keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(admins) = lookup(ADMIN_EMAILS) {
            config.admin_emails = admins;
        }
        if let Some(raw) = lookup(STORE_TIMEOUT_MS) {
            let millis: u64 = parse(STORE_TIMEOUT_MS, &raw)?;
            if millis == 0 {
                return Err(invalid(STORE_TIMEOUT_MS, &raw, "must be greater than zero"));
            }
            config.store_timeout = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup(CHANNEL_BUFFER) {
            let buffer: usize = parse(CHANNEL_BUFFER, &raw)?;
            if buffer == 0 {
                return Err(invalid(CHANNEL_BUFFER, &raw, "must be greater than zero"));
            }
            config.channel_buffer = buffer;
        }
        if let Some(filter) = lookup(LOG_FILTER).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }
        Ok(config)
    }

    /// Reads the process environment after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::from_allow_list(&self.admin_emails)
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| invalid(key, raw, &e.to_string()))
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
