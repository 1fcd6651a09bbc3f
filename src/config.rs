//! Configuration types for yt-view-stats

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Default base URL of the YouTube Data API v3
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Main configuration for [`ViewStatsAnalyzer`](crate::ViewStatsAnalyzer)
///
/// Every section has sensible defaults, so `Config::default()` is a working
/// configuration; only the API key has to be supplied separately.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry/backoff settings applied to every remote call
    #[serde(default)]
    pub retry: RetryConfig,

    /// Channel reference resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Time-series aggregation settings
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Report output settings
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    /// Check the configuration for values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.api.base_url).map_err(|e| {
            Error::config(format!("invalid API base URL: {}", e), "api.base_url")
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::config(
                format!("API base URL must be http(s), got {}", base.scheme()),
                "api.base_url",
            ));
        }
        if self.api.timeout.is_zero() {
            return Err(Error::config("request timeout must be non-zero", "api.timeout"));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config(
                "at least one attempt is required",
                "retry.max_attempts",
            ));
        }
        if !self.retry.backoff_multiplier.is_finite() || self.retry.backoff_multiplier < 1.0 {
            return Err(Error::config(
                "backoff multiplier must be a finite number of at least 1.0",
                "retry.backoff_multiplier",
            ));
        }
        if self.retry.initial_delay > self.retry.max_delay {
            return Err(Error::config(
                "initial delay must not exceed max delay",
                "retry.initial_delay",
            ));
        }
        match self.aggregation.rolling_window {
            RollingWindow::Fixed { size: 0 } => Err(Error::config(
                "rolling window size must be at least 1",
                "aggregation.rolling_window",
            )),
            RollingWindow::Proportional { divisor: 0 } => Err(Error::config(
                "rolling window divisor must be at least 1",
                "aggregation.rolling_window",
            )),
            _ => Ok(()),
        }
    }
}

/// Remote API connection settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the YouTube Data API (default: "https://www.googleapis.com/youtube/v3")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_ms_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Retry configuration for transient failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per call, including the first (default: 4)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (default: 500 ms)
    #[serde(default = "default_initial_delay", with = "duration_ms_serde")]
    pub initial_delay: Duration,

    /// Upper bound for any single delay (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_ms_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Channel reference resolution settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Fall back to a channel search when a legacy `/user/` or `/c/` name
    /// is not a username (default: true)
    ///
    /// Custom URLs are not usernames, so the direct lookup misses them; the
    /// search takes the top-ranked channel, which is a best-effort match.
    #[serde(default = "default_true")]
    pub search_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_fallback: true,
        }
    }
}

/// Time-series aggregation settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Rolling-average window (default: fixed, 5 videos)
    #[serde(default)]
    pub rolling_window: RollingWindow,
}

/// Window used for the rolling average of view counts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RollingWindow {
    /// A constant number of videos
    Fixed {
        /// Window size in videos
        size: usize,
    },
    /// A fraction of the series length: `max(1, len / divisor)`
    Proportional {
        /// Series length is divided by this
        divisor: usize,
    },
}

impl Default for RollingWindow {
    fn default() -> Self {
        RollingWindow::Fixed { size: 5 }
    }
}

impl RollingWindow {
    /// Window size for a series of `len` records (always at least 1)
    pub fn resolve(&self, len: usize) -> usize {
        match *self {
            RollingWindow::Fixed { size } => size.max(1),
            RollingWindow::Proportional { divisor } => (len / divisor.max(1)).max(1),
        }
    }
}

/// Report output settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory the report files are written to (default: ".")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("yt-view-stats/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_attempts() -> u32 {
    4
}

fn default_initial_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

// Duration serialization helper (integer milliseconds)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
