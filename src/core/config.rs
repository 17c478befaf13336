/*!
 * Mailbox Configuration
 *
 * Poll cadence, receive timeout and registration flags for mailbox consumers.
 */

use super::errors::{MailboxError, MailboxResult};
use super::limits::*;
use nix::sys::signal::SaFlags;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Consumer-side configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    /// Sleep between polls that come back `NotReady` (default: 100ms)
    pub poll_interval_ms: u64,

    /// Give up after this long without a delivery; `None` waits forever (default: 10s)
    pub receive_timeout_ms: Option<u64>,

    /// Register handlers with `SA_RESTART` (default: true)
    pub restart_interrupted: bool,
}

impl MailboxConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self {
            poll_interval_ms: millis(STANDARD_POLL_INTERVAL),
            receive_timeout_ms: Some(millis(STANDARD_RECEIVE_TIMEOUT)),
            restart_interrupted: true,
        }
    }

    /// Tight polling and short timeouts, for tests and development
    pub fn aggressive() -> Self {
        Self {
            poll_interval_ms: millis(AGGRESSIVE_POLL_INTERVAL),
            receive_timeout_ms: Some(millis(AGGRESSIVE_RECEIVE_TIMEOUT)),
            restart_interrupted: true,
        }
    }

    /// Slow polling and long timeouts, for loaded machines
    pub fn relaxed() -> Self {
        Self {
            poll_interval_ms: millis(RELAXED_POLL_INTERVAL),
            receive_timeout_ms: Some(millis(RELAXED_RECEIVE_TIMEOUT)),
            restart_interrupted: true,
        }
    }

    /// Wait forever instead of timing out
    pub fn without_timeout(mut self) -> Self {
        self.receive_timeout_ms = None;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = millis(interval);
        self
    }

    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout_ms = Some(millis(timeout));
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn receive_timeout(&self) -> Option<Duration> {
        self.receive_timeout_ms.map(Duration::from_millis)
    }

    /// Registration flags implied by this configuration
    pub fn flags(&self) -> SaFlags {
        if self.restart_interrupted {
            SaFlags::SA_RESTART
        } else {
            SaFlags::empty()
        }
    }

    /// Defaults overridden by `MAILBOX_*` environment variables
    ///
    /// Environment variables:
    /// - MAILBOX_POLL_INTERVAL_MS: poll interval in milliseconds
    /// - MAILBOX_RECEIVE_TIMEOUT_MS: receive timeout in milliseconds, 0 waits forever
    /// - MAILBOX_RESTART: register with SA_RESTART (1/0, true/false)
    pub fn from_env() -> MailboxResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load a JSON document; absent fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> MailboxResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| MailboxError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> MailboxResult<Self> {
        serde_json::from_str(text).map_err(|e| MailboxError::Config(e.to_string()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MailboxResult<Self> {
        let mut config = Self::new();

        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            config.poll_interval_ms = parse_millis(ENV_POLL_INTERVAL_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RECEIVE_TIMEOUT_MS) {
            config.receive_timeout_ms = match parse_millis(ENV_RECEIVE_TIMEOUT_MS, &raw)? {
                0 => None,
                ms => Some(ms),
            };
        }
        if let Some(raw) = lookup(ENV_RESTART) {
            config.restart_interrupted = parse_flag(ENV_RESTART, &raw)?;
        }

        Ok(config)
    }
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn parse_millis(name: &str, raw: &str) -> MailboxResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| MailboxError::Config(format!("{} must be whole milliseconds, got {:?}", name, raw)))
}

pub(crate) fn parse_flag(name: &str, raw: &str) -> MailboxResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MailboxError::Config(format!("{} must be a boolean, got {:?}", name, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MailboxConfig::default();
        assert_eq!(config.poll_interval(), STANDARD_POLL_INTERVAL);
        assert_eq!(config.receive_timeout(), Some(STANDARD_RECEIVE_TIMEOUT));
        assert_eq!(config.flags(), SaFlags::SA_RESTART);
    }

    #[test]
    fn test_env_overrides() {
        let config = MailboxConfig::from_lookup(lookup(&[
            (ENV_POLL_INTERVAL_MS, "25"),
            (ENV_RECEIVE_TIMEOUT_MS, "0"),
            (ENV_RESTART, "false"),
        ]))
        .unwrap();

        assert_eq!(config.poll_interval(), Duration::from_millis(25));
        assert_eq!(config.receive_timeout(), None);
        assert!(config.flags().is_empty());
    }

    #[test]
    fn test_env_rejects_garbage() {
        let err = MailboxConfig::from_lookup(lookup(&[(ENV_POLL_INTERVAL_MS, "soon")])).unwrap_err();
        assert!(matches!(err, MailboxError::Config(_)));

        let err = MailboxConfig::from_lookup(lookup(&[(ENV_RESTART, "maybe")])).unwrap_err();
        assert!(matches!(err, MailboxError::Config(_)));
    }

    #[test]
    fn test_json_partial_document() {
        let config = MailboxConfig::from_json(r#"{ "poll_interval_ms": 5 }"#).unwrap();
        assert_eq!(config.poll_interval_ms, 5);
        assert_eq!(config.receive_timeout_ms, MailboxConfig::new().receive_timeout_ms);
    }
}
