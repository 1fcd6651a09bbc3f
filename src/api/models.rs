//! Response models for the YouTube Data API v3
//!
//! Only the fields the pipeline reads are modeled; everything else in the
//! payload is ignored by serde.

use crate::types::{ChannelId, VideoId};
use serde::{Deserialize, Serialize};

// ============================================================================
// Envelopes
// ============================================================================

/// Generic list response (`youtube#...ListResponse`)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    /// Items on this page; absent when there are none
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Continuation cursor for the next page
    pub next_page_token: Option<String>,
    /// Paging information
    pub page_info: Option<PageInfo>,
}

/// Paging information of a list response
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Total number of results in the collection
    pub total_results: Option<u64>,
}

/// Google API error envelope (`{"error": {...}}`)
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    /// The error body
    pub error: GoogleError,
}

/// Error body of a failed Google API call
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleError {
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Individual error entries carrying the machine-readable reason
    #[serde(default)]
    pub errors: Vec<GoogleErrorItem>,
}

/// One entry of [`GoogleError::errors`]
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorItem {
    /// Machine-readable reason (e.g., "quotaExceeded")
    pub reason: Option<String>,
}

// ============================================================================
// channels.list
// ============================================================================

/// `youtube#channel` resource
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResource {
    /// Channel ID
    pub id: String,
    /// Channel snippet (title, custom URL)
    pub snippet: Option<ChannelSnippet>,
    /// Content details (related playlists)
    pub content_details: Option<ChannelContentDetails>,
}

impl ChannelResource {
    /// Channel title, if the snippet part was returned
    pub fn title(&self) -> Option<&str> {
        self.snippet.as_ref().map(|s| s.title.as_str())
    }

    /// Uploads playlist ID, if the contentDetails part was returned
    pub fn uploads_playlist(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .and_then(|d| d.related_playlists.uploads.as_deref())
    }
}

/// Snippet part of a channel
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
    /// Channel title
    pub title: String,
}

/// contentDetails part of a channel
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    /// Playlists associated with the channel
    pub related_playlists: RelatedPlaylists,
}

/// Playlists associated with a channel
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelatedPlaylists {
    /// Playlist holding every public upload, most recent first
    pub uploads: Option<String>,
}

// ============================================================================
// playlistItems.list
// ============================================================================

/// `youtube#playlistItem` resource
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    /// contentDetails part
    pub content_details: PlaylistItemContentDetails,
}

/// contentDetails part of a playlist item
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    /// ID of the video the item refers to
    pub video_id: String,
}

/// One page of a playlist, reduced to what enumeration needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistItemsPage {
    /// Video IDs in playlist order
    pub video_ids: Vec<VideoId>,
    /// Continuation cursor; `None` when the playlist is exhausted
    pub next_page_token: Option<String>,
    /// Total number of items in the playlist, when reported
    pub total_results: Option<u64>,
}

impl From<ListResponse<PlaylistItem>> for PlaylistItemsPage {
    fn from(response: ListResponse<PlaylistItem>) -> Self {
        Self {
            video_ids: response
                .items
                .into_iter()
                .map(|item| VideoId(item.content_details.video_id))
                .collect(),
            // An empty token means the same as a missing one
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
            total_results: response.page_info.and_then(|p| p.total_results),
        }
    }
}

// ============================================================================
// videos.list
// ============================================================================

/// `youtube#video` resource
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    /// Video ID
    pub id: String,
    /// Snippet part (title, publish time)
    pub snippet: Option<VideoSnippet>,
    /// Statistics part (view count)
    pub statistics: Option<VideoStatistics>,
}

/// Snippet part of a video
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    /// Video title
    pub title: String,
    /// ISO 8601 publish timestamp, e.g. "2024-01-03T15:00:00Z"
    pub published_at: String,
}

/// Statistics part of a video
///
/// The API encodes counters as decimal strings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    /// View count; absent when the owner hides statistics
    pub view_count: Option<String>,
}

// ============================================================================
// search.list
// ============================================================================

/// `youtube#searchResult` resource (channel results only)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Result identity
    pub id: SearchResultId,
    /// Snippet part
    pub snippet: Option<SearchSnippet>,
}

/// Identity of a search result
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    /// Resource kind, e.g. "youtube#channel"
    pub kind: String,
    /// Channel ID for channel results
    pub channel_id: Option<String>,
}

/// Snippet part of a search result
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnippet {
    /// Title of the matched resource
    pub title: String,
}

/// A channel found by free-text search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSearchHit {
    /// Channel ID
    pub channel_id: ChannelId,
    /// Channel title
    pub title: String,
}

impl SearchResult {
    /// Convert to a channel hit; non-channel results yield `None`
    pub fn into_channel_hit(self) -> Option<ChannelSearchHit> {
        let channel_id = self.id.channel_id?;
        Some(ChannelSearchHit {
            channel_id: ChannelId(channel_id),
            title: self.snippet.map(|s| s.title).unwrap_or_default(),
        })
    }
}
