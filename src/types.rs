//! Core types for yt-view-stats

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use crate::error::{Error, Result};

/// Canonical YouTube channel identifier (e.g., "UC_x5XG1OV2P6uZZ5FSM9Ttw")
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    /// Create a new ChannelId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// YouTube video identifier (e.g., "dQw4w9WgXcQ")
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create a new VideoId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VideoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VideoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How many of a channel's most recent uploads to analyze
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VideoCount {
    /// At most this many uploads, most recent first
    Limited(NonZeroUsize),
    /// Every upload in the channel's uploads collection
    All,
}

impl VideoCount {
    /// Create a limited count; zero is rejected
    pub fn limited(n: usize) -> Option<Self> {
        NonZeroUsize::new(n).map(VideoCount::Limited)
    }

    /// The cap as a plain number, `None` for [`VideoCount::All`]
    pub fn limit(&self) -> Option<usize> {
        match self {
            VideoCount::Limited(n) => Some(n.get()),
            VideoCount::All => None,
        }
    }

    /// Whether `collected` items satisfy this count
    pub fn is_reached(&self, collected: usize) -> bool {
        self.limit().is_some_and(|n| collected >= n)
    }
}

impl std::fmt::Display for VideoCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoCount::Limited(n) => write!(f, "{}", n),
            VideoCount::All => f.write_str("all"),
        }
    }
}

impl std::str::FromStr for VideoCount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(VideoCount::All);
        }
        s.parse::<usize>()
            .ok()
            .and_then(VideoCount::limited)
            .ok_or_else(|| {
                Error::config(
                    format!("video count must be a positive integer or \"all\", got {s:?}"),
                    "video_count",
                )
            })
    }
}

/// Static YouTube Data API key
///
/// Validated once at construction; the value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Validate and wrap an API key
    ///
    /// Surrounding whitespace (e.g., a trailing newline from a key file) is trimmed.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidApiKey("API key is empty".into()));
        }
        if let Some(bad) = key
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(Error::InvalidApiKey(format!(
                "API key contains unexpected character {bad:?}"
            )));
        }
        Ok(Self(key.to_string()))
    }

    /// The raw key, for the `X-Goog-Api-Key` request header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Channel metadata needed by the rest of the pipeline
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Canonical channel ID
    pub id: ChannelId,
    /// Channel display title
    pub title: String,
    /// Playlist ID of the channel's uploads collection
    pub uploads_playlist: String,
}

/// View statistics for a single video
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Video ID
    pub video_id: VideoId,
    /// Video title
    pub title: String,
    /// When the video was published
    pub published_at: DateTime<Utc>,
    /// Public view count (0 when the channel hides statistics)
    pub view_count: u64,
}

/// Chronologically ordered, de-duplicated records with their rolling average
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSeries {
    /// Records sorted ascending by `published_at`
    pub records: Vec<VideoRecord>,
    /// Rolling average of `view_count`, one value per record
    pub rolling_average: Vec<f64>,
    /// Window size the average was computed with
    pub window: usize,
}

impl AggregatedSeries {
    /// Number of records in the series
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the series holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over `(record, rolling average)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&VideoRecord, f64)> {
        self.records
            .iter()
            .zip(self.rolling_average.iter().copied())
    }

    /// Sum of all view counts
    pub fn total_views(&self) -> u64 {
        self.records.iter().map(|r| r.view_count).sum()
    }

    /// Publish time of the oldest record
    pub fn first_published(&self) -> Option<DateTime<Utc>> {
        self.records.first().map(|r| r.published_at)
    }

    /// Publish time of the newest record
    pub fn last_published(&self) -> Option<DateTime<Utc>> {
        self.records.last().map(|r| r.published_at)
    }
}

/// Result of one `analyze` request
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelAnalysis {
    /// The resolved channel
    pub channel: ChannelInfo,
    /// The video count the caller asked for
    pub requested: VideoCount,
    /// The aggregated view-count series
    pub series: AggregatedSeries,
}

/// Progress event emitted while an analysis runs
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Resolution of a channel reference started
    Resolving {
        /// The reference as supplied
        reference: String,
    },

    /// Channel reference resolved and channel metadata fetched
    ChannelResolved {
        /// Canonical channel ID
        channel_id: ChannelId,
        /// Channel title
        title: String,
    },

    /// One page of the uploads collection was fetched
    PageFetched {
        /// 1-based page number
        page: usize,
        /// Video IDs collected so far
        collected: usize,
    },

    /// One batch of video details was fetched
    BatchFetched {
        /// 1-based batch number
        batch: usize,
        /// Total number of batches
        total: usize,
        /// Records collected so far
        records: usize,
    },

    /// A remote call failed transiently and will be retried
    Retrying {
        /// Logical API operation
        operation: String,
        /// Attempt that just failed (1-based)
        attempt: u32,
        /// Delay before the next attempt, in milliseconds
        delay_ms: u64,
    },

    /// The analysis finished
    Completed {
        /// Channel title
        title: String,
        /// Number of records in the series
        videos: usize,
    },

    /// The analysis failed
    Failed {
        /// Machine-readable error code
        code: String,
        /// Error message
        error: String,
    },
}
