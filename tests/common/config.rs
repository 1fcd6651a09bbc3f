//! Test configuration helpers for mock servers and live credentials

use std::path::Path;
use std::time::Duration;
use wiremock::MockServer;
use yt_view_stats::config::RetryConfig;
use yt_view_stats::{ApiKey, Config, ViewStatsAnalyzer};

/// Error type for test configuration
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Key sent to mock servers
pub const TEST_API_KEY: &str = "AIzaTestKey_123-abc";

/// Config pointing at `server` with millisecond retry delays
pub fn mock_config(server: &MockServer, max_attempts: u32) -> Config {
    let mut config = Config::default();
    config.api.base_url = format!("{}/youtube/v3", server.uri());
    config.api.timeout = Duration::from_secs(5);
    config.retry = RetryConfig {
        max_attempts,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(10),
        backoff_multiplier: 2.0,
        jitter: false,
    };
    config
}

/// Analyzer talking HTTP to `server`, writing reports into `output_dir`
pub fn mock_analyzer(server: &MockServer, max_attempts: u32, output_dir: &Path) -> ViewStatsAnalyzer {
    let mut config = mock_config(server, max_attempts);
    config.report.output_dir = output_dir.to_path_buf();
    ViewStatsAnalyzer::new(config, ApiKey::new(TEST_API_KEY).unwrap()).unwrap()
}

/// Load the YouTube Data API key from the environment (or .env)
///
/// Required environment variables:
/// - `YOUTUBE_API_KEY` - API key with YouTube Data API v3 enabled
pub fn load_api_key() -> Result<ApiKey, ConfigError> {
    dotenvy::dotenv().ok();

    let raw = std::env::var("YOUTUBE_API_KEY")
        .map_err(|_| ConfigError("YOUTUBE_API_KEY not set in environment".to_string()))?;

    ApiKey::new(raw).map_err(|e| ConfigError(e.to_string()))
}

/// Check if live credentials are available
pub fn has_live_credentials() -> bool {
    load_api_key().is_ok()
}
