//! # yt-view-stats
//!
//! Retrieve a YouTube channel's video-level view-count history, aggregate
//! it into a time series with a rolling average, and write it out as a
//! spreadsheet report with a line chart.
//!
//! ## Design Philosophy
//!
//! yt-view-stats is designed to be:
//! - **Library-first** - No CLI or UI; a presentation layer embeds it
//! - **Sensible defaults** - Works with nothing but an API key
//! - **Quota-aware** - Every remote call goes through one retry policy
//! - **Event-driven** - Progress is broadcast to subscribers
//!
//! ## Quick Start
//!
//! ```no_run
//! use yt_view_stats::{ApiKey, Config, VideoCount, ViewStatsAnalyzer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let key = ApiKey::new(std::env::var("YOUTUBE_API_KEY")?)?;
//!     let analyzer = ViewStatsAnalyzer::new(Config::default(), key)?;
//!
//!     // Subscribe to progress events
//!     let mut events = analyzer.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let analysis = analyzer
//!         .analyze("https://www.youtube.com/@GoogleDevelopers", "50".parse()?)
//!         .await?;
//!     let path = analyzer.write_report(&analysis)?;
//!     println!("Report written to {}", path.display());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Time-series aggregation
pub mod aggregator;
/// YouTube Data API access
pub mod api;
/// Detail batching
pub mod batcher;
/// Configuration types
pub mod config;
/// Upload enumeration
pub mod enumerator;
/// Error types
pub mod error;
/// The analysis entry point
pub mod pipeline;
/// Spreadsheet report emission
pub mod report;
/// Channel reference parsing and resolution
pub mod resolver;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types and events
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use api::{HttpYouTubeApi, YouTubeApi};
pub use config::{Config, RollingWindow};
pub use error::{ApiError, EmitError, Error, PartialBatch, Result};
pub use pipeline::ViewStatsAnalyzer;
pub use report::{ReportSink, XlsxReportEmitter};
pub use resolver::ChannelReference;
pub use types::{
    AggregatedSeries, ApiKey, ChannelAnalysis, ChannelId, ChannelInfo, Event, VideoCount,
    VideoId, VideoRecord,
};
