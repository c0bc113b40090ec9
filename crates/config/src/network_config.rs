//! Network configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Seconds allowed to establish a connection
    pub connect_timeout_secs: u64,

    /// Deadline in seconds for a whole exchange, body included (0 = none)
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Maximum redirects to follow
    pub max_redirects: usize,

    /// Size of the pieces a response body is delivered in
    pub chunk_size: usize,

    /// Log a notice whenever a request or response body is streamed
    pub debug_streaming: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 0,
            user_agent: format!("bodystream/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
            chunk_size: 16 * 1024,
            debug_streaming: false,
        }
    }
}

impl NetworkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `None` when `timeout_secs` is 0
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl ConfigSection for NetworkConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(self.connect_timeout_secs, 1, 3_600, "network.connect_timeout_secs"),
            Validator::in_range(self.timeout_secs, 0, 86_400, "network.timeout_secs"),
            Validator::not_empty(&self.user_agent, "network.user_agent"),
            Validator::in_range(self.max_redirects, 0, 50, "network.max_redirects"),
            Validator::in_range(self.chunk_size, 512, 1 << 20, "network.chunk_size"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.connect_timeout_secs = other.connect_timeout_secs;
        self.timeout_secs = other.timeout_secs;
        self.user_agent = other.user_agent;
        self.max_redirects = other.max_redirects;
        self.chunk_size = other.chunk_size;
        self.debug_streaming = other.debug_streaming;
    }

    fn section_name(&self) -> &'static str {
        "network"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = NetworkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_zero_timeout_means_no_deadline() {
        let mut config = NetworkConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), None);

        config.timeout_secs = 90;
        assert_eq!(config.timeout(), Some(Duration::from_secs(90)));

        config.timeout_secs = 100_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_connect_timeout() {
        let mut config = NetworkConfig::default();
        config.connect_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_chunk_size() {
        let mut config = NetworkConfig::default();
        config.chunk_size = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_multiple_validation_errors() {
        let config = NetworkConfig {
            connect_timeout_secs: 0,
            user_agent: "   ".to_string(),
            max_redirects: 99,
            ..Default::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().len(), 3);
    }

    #[test]
    fn test_merge() {
        let mut base = NetworkConfig::default();
        let other = NetworkConfig {
            user_agent: "probe/1.0".to_string(),
            debug_streaming: true,
            ..Default::default()
        };

        base.merge(other);
        assert_eq!(base.user_agent, "probe/1.0");
        assert!(base.debug_streaming);
    }
}
