//! Scripted in-memory [`YouTubeApi`] for unit tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::api::models::{
    ChannelContentDetails, ChannelSnippet, RelatedPlaylists, VideoSnippet, VideoStatistics,
};
use crate::api::{
    ChannelLookup, ChannelResource, ChannelSearchHit, PlaylistItemsPage, VideoResource,
    YouTubeApi, operation,
};
use crate::error::ApiError;
use crate::types::{ChannelId, VideoId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

struct FakeChannel {
    resource: ChannelResource,
    username: Option<String>,
    handle: Option<String>,
}

struct ScriptedFailure {
    operation: &'static str,
    /// Zero-based call indices (per operation) that fail
    calls: std::ops::Range<usize>,
    status: u16,
    reason: Option<&'static str>,
}

/// Fake API with channels, playlists, and videos set up by the test
///
/// Playlists are served in pages of at most `max_results` with tokens
/// `"page-<n>"`. Failures are scripted per operation and call index.
#[derive(Default)]
pub(crate) struct FakeYouTubeApi {
    channels: Vec<FakeChannel>,
    playlists: HashMap<String, Vec<VideoId>>,
    videos: HashMap<String, VideoResource>,
    search_hits: HashMap<String, Vec<ChannelSearchHit>>,
    failures: Vec<ScriptedFailure>,
    stuck_cursor: bool,
    calls: Mutex<HashMap<&'static str, usize>>,
    video_requests: Mutex<Vec<Vec<VideoId>>>,
}

impl FakeYouTubeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a channel reachable by ID, and optionally by username and handle
    pub(crate) fn with_channel(
        mut self,
        id: &str,
        title: &str,
        uploads: &str,
        username: Option<&str>,
        handle: Option<&str>,
    ) -> Self {
        self.channels.push(FakeChannel {
            resource: ChannelResource {
                id: id.to_string(),
                snippet: Some(ChannelSnippet {
                    title: title.to_string(),
                }),
                content_details: Some(ChannelContentDetails {
                    related_playlists: RelatedPlaylists {
                        uploads: Some(uploads.to_string()),
                    },
                }),
            },
            username: username.map(str::to_string),
            handle: handle.map(|h| h.trim_start_matches('@').to_string()),
        });
        self
    }

    /// Add a channel resource as-is (e.g., without contentDetails)
    pub(crate) fn with_raw_channel(mut self, resource: ChannelResource) -> Self {
        self.channels.push(FakeChannel {
            resource,
            username: None,
            handle: None,
        });
        self
    }

    /// Set the uploads playlist contents, most recent first
    pub(crate) fn with_uploads<I, S>(mut self, playlist: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.playlists.insert(
            playlist.to_string(),
            ids.into_iter().map(|id| VideoId(id.into())).collect(),
        );
        self
    }

    /// Add a video; `views: None` models hidden statistics
    pub(crate) fn with_video(
        self,
        id: &str,
        title: &str,
        published_at: &str,
        views: Option<u64>,
    ) -> Self {
        self.with_raw_video(VideoResource {
            id: id.to_string(),
            snippet: Some(VideoSnippet {
                title: title.to_string(),
                published_at: published_at.to_string(),
            }),
            statistics: Some(VideoStatistics {
                view_count: views.map(|v| v.to_string()),
            }),
        })
    }

    /// Add a video resource as-is
    pub(crate) fn with_raw_video(mut self, video: VideoResource) -> Self {
        self.videos.insert(video.id.clone(), video);
        self
    }

    /// Answer `search.list` for `query` with a single channel hit
    pub(crate) fn with_search_hit(mut self, query: &str, id: &str, title: &str) -> Self {
        self.search_hits
            .entry(query.to_lowercase())
            .or_default()
            .push(ChannelSearchHit {
                channel_id: ChannelId::from(id),
                title: title.to_string(),
            });
        self
    }

    /// Fail the given calls of `operation` with an HTTP status
    pub(crate) fn failing(
        mut self,
        operation: &'static str,
        calls: std::ops::Range<usize>,
        status: u16,
        reason: Option<&'static str>,
    ) -> Self {
        self.failures.push(ScriptedFailure {
            operation,
            calls,
            status,
            reason,
        });
        self
    }

    /// Always hand back the same continuation token
    pub(crate) fn with_stuck_cursor(mut self) -> Self {
        self.stuck_cursor = true;
        self
    }

    /// Number of calls made to `operation`, failed ones included
    pub(crate) fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// ID lists passed to `videos.list`, in call order
    pub(crate) fn video_requests(&self) -> Vec<Vec<VideoId>> {
        self.video_requests.lock().unwrap().clone()
    }

    fn record_call(&self, operation: &'static str) -> Result<(), ApiError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(operation).or_insert(0);
            let index = *count;
            *count += 1;
            index
        };

        match self
            .failures
            .iter()
            .find(|f| f.operation == operation && f.calls.contains(&index))
        {
            Some(failure) => Err(ApiError::Status {
                status: failure.status,
                reason: failure.reason.map(str::to_string),
                message: format!("scripted failure of {} call {}", operation, index),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl YouTubeApi for FakeYouTubeApi {
    async fn list_channels(&self, lookup: &ChannelLookup) -> Result<Vec<ChannelResource>, ApiError> {
        self.record_call(operation::CHANNELS_LIST)?;
        let matches = self.channels.iter().filter(|c| match lookup {
            ChannelLookup::ById(id) => c.resource.id == id.as_str(),
            ChannelLookup::ByUsername(name) => c
                .username
                .as_deref()
                .is_some_and(|u| u.eq_ignore_ascii_case(name)),
            ChannelLookup::ByHandle(handle) => c
                .handle
                .as_deref()
                .is_some_and(|h| h.eq_ignore_ascii_case(handle.trim_start_matches('@'))),
        });
        Ok(matches.map(|c| c.resource.clone()).collect())
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        max_results: u32,
    ) -> Result<PlaylistItemsPage, ApiError> {
        self.record_call(operation::PLAYLIST_ITEMS_LIST)?;
        let items = self
            .playlists
            .get(playlist_id)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                reason: Some("playlistNotFound".to_string()),
                message: format!("playlist {} not found", playlist_id),
            })?;

        let page = match page_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| ApiError::Status {
                    status: 400,
                    reason: Some("invalidPageToken".to_string()),
                    message: format!("bad page token {}", token),
                })?,
        };
        let size = max_results as usize;
        let start = (page * size).min(items.len());
        let end = (start + size).min(items.len());

        let next_page_token = if self.stuck_cursor {
            Some("page-1".to_string())
        } else if end < items.len() {
            Some(format!("page-{}", page + 1))
        } else {
            None
        };

        Ok(PlaylistItemsPage {
            video_ids: items[start..end].to_vec(),
            next_page_token,
            total_results: Some(items.len() as u64),
        })
    }

    async fn list_videos(&self, ids: &[VideoId]) -> Result<Vec<VideoResource>, ApiError> {
        self.video_requests.lock().unwrap().push(ids.to_vec());
        self.record_call(operation::VIDEOS_LIST)?;
        Ok(ids
            .iter()
            .filter_map(|id| self.videos.get(id.as_str()).cloned())
            .collect())
    }

    async fn search_channels(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<ChannelSearchHit>, ApiError> {
        self.record_call(operation::SEARCH_LIST)?;
        Ok(self
            .search_hits
            .get(&query.to_lowercase())
            .map(|hits| hits.iter().take(max_results as usize).cloned().collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
