//! Feed configuration

use std::time::Duration;

/// Configuration for the snapshot feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Bounded outbound queue length per subscriber.
    pub subscriber_queue_capacity: usize,
    /// Longest a single delivery may wait on a full queue before the
    /// subscriber is evicted.
    pub send_timeout: Duration,
    /// Capacity of the eviction event channel.
    pub eviction_channel_capacity: usize,
    /// Most snapshots kept in history. `None` keeps every snapshot for the
    /// life of the process; with a cap the oldest entries are dropped first.
    pub history_capacity: Option<usize>,
    /// History window requested when a snapshot triggers analysis.
    pub default_period: String,
    /// Bar interval requested when a snapshot triggers analysis.
    pub default_interval: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            subscriber_queue_capacity: 64,
            send_timeout: Duration::from_millis(250),
            eviction_channel_capacity: 256,
            history_capacity: None,
            default_period: signal_engine::DEFAULT_PERIOD.to_string(),
            default_interval: signal_engine::DEFAULT_INTERVAL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.subscriber_queue_capacity, 64);
        assert_eq!(config.send_timeout, Duration::from_millis(250));
        assert_eq!(config.history_capacity, None);
        assert_eq!(config.default_period, "2y");
        assert_eq!(config.default_interval, "1d");
    }
}
