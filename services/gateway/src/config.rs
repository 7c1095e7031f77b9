use std::env;
use std::path::PathBuf;
use std::time::Duration;

use signal_engine::YahooConfig;
use snapshot_feed::FeedConfig;

/// Gateway configuration derived from environment variables.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind: String,
    pub port: u16,

    // ── Calibration ────────────────────────────────────────────────
    pub calibration_path: PathBuf,

    // ── Market data ────────────────────────────────────────────────
    pub market_data_url: String,
    pub market_data_timeout: Duration,
    pub default_period: String,
    pub default_interval: String,

    // ── Live feed ──────────────────────────────────────────────────
    pub subscriber_queue: usize,
    pub send_timeout: Duration,
    /// Snapshots kept in memory. Unset ⇒ unbounded.
    pub history_capacity: Option<usize>,

    // ── Optional collaborators ─────────────────────────────────────
    /// Logistic model JSON. Unset ⇒ no probability estimate.
    pub model_path: Option<PathBuf>,
    /// Explanation service base URL. Unset ⇒ recommendations only.
    pub explainer_url: Option<String>,
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn env_opt(lookup: Lookup, name: &str) -> Option<String> {
    lookup(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_str(lookup: Lookup, name: &str, default: &str) -> String {
    env_opt(lookup, name).unwrap_or_else(|| default.to_string())
}

fn env_u16(lookup: Lookup, name: &str, default: u16) -> u16 {
    env_opt(lookup, name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_u64(lookup: Lookup, name: &str, default: u64) -> u64 {
    env_opt(lookup, name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&|name: &str| env::var(name).ok())
    }

    pub fn from_lookup(lookup: Lookup) -> Self {
        let yahoo = YahooConfig::default();
        let feed = FeedConfig::default();

        Self {
            bind: env_str(lookup, "BIND", "0.0.0.0"),
            port: env_u16(lookup, "PORT", 8000),
            calibration_path: PathBuf::from(env_str(
                lookup,
                "CALIBRATION_PATH",
                "vision_service/calibration.json",
            )),
            market_data_url: env_str(lookup, "MARKET_DATA_URL", &yahoo.base_url),
            market_data_timeout: Duration::from_millis(env_u64(
                lookup,
                "MARKET_DATA_TIMEOUT_MS",
                yahoo.timeout.as_millis() as u64,
            )),
            default_period: env_str(lookup, "DEFAULT_PERIOD", &feed.default_period),
            default_interval: env_str(lookup, "DEFAULT_INTERVAL", &feed.default_interval),
            subscriber_queue: env_u64(
                lookup,
                "SUBSCRIBER_QUEUE",
                feed.subscriber_queue_capacity as u64,
            ) as usize,
            send_timeout: Duration::from_millis(env_u64(
                lookup,
                "SEND_TIMEOUT_MS",
                feed.send_timeout.as_millis() as u64,
            )),
            history_capacity: env_opt(lookup, "HISTORY_CAPACITY").and_then(|v| v.parse().ok()),
            model_path: env_opt(lookup, "MODEL_PATH").map(PathBuf::from),
            explainer_url: env_opt(lookup, "EXPLAINER_URL"),
        }
    }

    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            subscriber_queue_capacity: self.subscriber_queue,
            send_timeout: self.send_timeout,
            history_capacity: self.history_capacity,
            default_period: self.default_period.clone(),
            default_interval: self.default_interval.clone(),
            ..FeedConfig::default()
        }
    }

    pub fn yahoo_config(&self) -> YahooConfig {
        YahooConfig {
            base_url: self.market_data_url.clone(),
            timeout: self.market_data_timeout,
            ..YahooConfig::default()
        }
    }
}
