//! YouTube Data API v3 access
//!
//! The pipeline talks to the remote API only through the [`YouTubeApi`]
//! trait. [`HttpYouTubeApi`] is the production implementation; tests swap in
//! scripted doubles.
//!
//! ## Operations
//!
//! | Method | Endpoint | Used by |
//! |---|---|---|
//! | [`list_channels`](YouTubeApi::list_channels) | `channels.list` | resolver, uploads lookup |
//! | [`list_playlist_items`](YouTubeApi::list_playlist_items) | `playlistItems.list` | upload enumeration |
//! | [`list_videos`](YouTubeApi::list_videos) | `videos.list` | detail batches |
//! | [`search_channels`](YouTubeApi::search_channels) | `search.list` | legacy custom-URL fallback |

mod http;
pub mod models;

pub use http::HttpYouTubeApi;
pub use models::{ChannelResource, ChannelSearchHit, PlaylistItemsPage, VideoResource};

use crate::error::ApiError;
use crate::types::{ChannelId, VideoId};
use async_trait::async_trait;

/// Maximum `maxResults` for list endpoints, and maximum IDs per `videos.list` call
pub const MAX_RESULTS_PER_PAGE: u32 = 50;

/// Logical operation names, as reported in errors and retry events
pub mod operation {
    /// `channels.list`
    pub const CHANNELS_LIST: &str = "channels.list";
    /// `playlistItems.list`
    pub const PLAYLIST_ITEMS_LIST: &str = "playlistItems.list";
    /// `videos.list`
    pub const VIDEOS_LIST: &str = "videos.list";
    /// `search.list`
    pub const SEARCH_LIST: &str = "search.list";
}

/// Key for a `channels.list` lookup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelLookup {
    /// By canonical channel ID (`id=`)
    ById(ChannelId),
    /// By legacy username (`forUsername=`)
    ByUsername(String),
    /// By `@handle` (`forHandle=`)
    ByHandle(String),
}

impl ChannelLookup {
    /// Query parameter name and value for this lookup
    pub fn query_param(&self) -> (&'static str, &str) {
        match self {
            ChannelLookup::ById(id) => ("id", id.as_str()),
            ChannelLookup::ByUsername(name) => ("forUsername", name.as_str()),
            ChannelLookup::ByHandle(handle) => ("forHandle", handle.as_str()),
        }
    }
}

/// The remote operations the pipeline consumes
///
/// Implementations perform exactly one request per call; retrying is the
/// caller's job (see [`RetryGovernor`](crate::retry::RetryGovernor)).
#[async_trait]
pub trait YouTubeApi: Send + Sync {
    /// Look up channels (`channels.list` with `snippet` and `contentDetails`)
    async fn list_channels(&self, lookup: &ChannelLookup)
    -> Result<Vec<ChannelResource>, ApiError>;

    /// Fetch one page of a playlist's items
    ///
    /// `page_token` is the continuation cursor from the previous page, or
    /// `None` for the first page.
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        max_results: u32,
    ) -> Result<PlaylistItemsPage, ApiError>;

    /// Fetch snippet and statistics for up to [`MAX_RESULTS_PER_PAGE`] videos
    ///
    /// Videos that no longer exist are simply absent from the result.
    async fn list_videos(&self, ids: &[VideoId]) -> Result<Vec<VideoResource>, ApiError>;

    /// Free-text channel search, ranked by relevance
    async fn search_channels(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<ChannelSearchHit>, ApiError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
