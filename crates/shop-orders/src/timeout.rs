//! Timeout configuration for API calls.

use std::time::Duration;

/// Timeouts applied to every request the client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Connection timeout.
    pub connect: Duration,
    /// Total time for one attempt, body included.
    pub total: Duration,
}

impl TimeoutConfig {
    pub fn new(connect: Duration, total: Duration) -> Self {
        Self { connect, total }
    }

    /// Derive the connect timeout from a single total.
    pub fn from_total(total: Duration) -> Self {
        Self {
            connect: (total / 4).max(Duration::from_millis(100)).min(total),
            total,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_total(Duration::from_secs(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_total() {
        let config = TimeoutConfig::from_total(Duration::from_secs(8));
        assert_eq!(config.connect, Duration::from_secs(2));

        // Very short totals never get a connect timeout above the total
        let config = TimeoutConfig::from_total(Duration::from_millis(50));
        assert_eq!(config.connect, Duration::from_millis(50));
    }
}
