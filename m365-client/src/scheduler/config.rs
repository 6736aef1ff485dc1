//! Poller configuration
//!
//! Defines the polling interval and the optional bounds on how long a job
//! is polled before giving up.

use std::time::Duration;

/// Default delay between two progress checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Poller configuration
///
/// Without `max_attempts` or `timeout` a job is polled until it reports a
/// terminal event or the poll is cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// How long to wait between two progress checks
    pub interval: Duration,

    /// Maximum number of progress checks
    pub max_attempts: Option<u32>,

    /// Maximum time spent polling a single job
    pub timeout: Option<Duration>,
}

impl PollerConfig {
    /// Creates an unbounded configuration with the given interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            timeout: None,
        }
    }

    /// Limits the number of progress checks
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Limits the time spent polling
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval.is_zero() {
            anyhow::bail!("poll interval must be greater than 0");
        }

        if self.max_attempts == Some(0) {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PollerConfig::default();
        assert_eq!(config.interval, Duration::from_millis(500));
        assert!(config.max_attempts.is_none());
        assert!(config.timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = PollerConfig::default();
        assert!(config.validate().is_ok());

        config.interval = Duration::ZERO;
        assert!(config.validate().is_err());

        config.interval = Duration::from_secs(1);
        config = config.with_max_attempts(0);
        assert!(config.validate().is_err());

        config = config.with_max_attempts(3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_bounds() {
        let config = PollerConfig::new(Duration::from_secs(2))
            .with_max_attempts(10)
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.max_attempts, Some(10));
        assert_eq!(config.timeout, Some(Duration::from_secs(60)));
    }
}
