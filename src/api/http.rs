//! reqwest-backed [`YouTubeApi`] implementation

use super::models::{
    ChannelResource, ChannelSearchHit, ErrorEnvelope, ListResponse, PlaylistItem,
    PlaylistItemsPage, SearchResult, VideoResource,
};
use super::{ChannelLookup, YouTubeApi};
use crate::config::ApiConfig;
use crate::error::{ApiError, Error, Result};
use crate::types::{ApiKey, VideoId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// YouTube Data API v3 client over HTTPS
///
/// Holds a connection-pooled `reqwest::Client`; cloning is cheap and clones
/// share the pool.
#[derive(Clone)]
pub struct HttpYouTubeApi {
    client: reqwest::Client,
    base_url: String,
    key: ApiKey,
}

impl std::fmt::Debug for HttpYouTubeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpYouTubeApi")
            .field("base_url", &self.base_url)
            .field("key", &self.key)
            .finish()
    }
}

impl HttpYouTubeApi {
    /// Create a client for the configured base URL
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the HTTP client cannot be built
    pub fn new(config: &ApiConfig, key: ApiKey) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {}", e), "api"))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key,
        })
    }

    /// Base URL requests are issued against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one GET against `endpoint` and decode the JSON body
    ///
    /// The key travels in a header so it never appears in the request URL,
    /// which reqwest includes in its error messages.
    #[instrument(skip(self, query), fields(base_url = %self.base_url))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> std::result::Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header(API_KEY_HEADER, self.key.expose())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(serde_json::from_str(&body)?)
    }
}

/// Decode Google's error envelope, falling back to the status line
fn status_error(status: reqwest::StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let reason = envelope
                .error
                .errors
                .iter()
                .find_map(|item| item.reason.clone());
            let message = if envelope.error.message.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                envelope.error.message
            };
            ApiError::Status {
                status: status.as_u16(),
                reason,
                message,
            }
        }
        Err(_) => ApiError::Status {
            status: status.as_u16(),
            reason: None,
            message: status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        },
    }
}

#[async_trait]
impl YouTubeApi for HttpYouTubeApi {
    async fn list_channels(
        &self,
        lookup: &ChannelLookup,
    ) -> std::result::Result<Vec<ChannelResource>, ApiError> {
        let (param, value) = lookup.query_param();
        let response: ListResponse<ChannelResource> = self
            .get_json(
                "channels",
                &[("part", "id,snippet,contentDetails"), (param, value)],
            )
            .await?;
        Ok(response.items)
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        max_results: u32,
    ) -> std::result::Result<PlaylistItemsPage, ApiError> {
        let max_results = max_results.to_string();
        let mut query = vec![
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response: ListResponse<PlaylistItem> =
            self.get_json("playlistItems", &query).await?;
        Ok(response.into())
    }

    async fn list_videos(
        &self,
        ids: &[VideoId],
    ) -> std::result::Result<Vec<VideoResource>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids
            .iter()
            .map(VideoId::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let response: ListResponse<VideoResource> = self
            .get_json(
                "videos",
                &[("part", "snippet,statistics"), ("id", joined.as_str())],
            )
            .await?;
        Ok(response.items)
    }

    async fn search_channels(
        &self,
        query: &str,
        max_results: u32,
    ) -> std::result::Result<Vec<ChannelSearchHit>, ApiError> {
        let max_results = max_results.to_string();
        let response: ListResponse<SearchResult> = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "channel"),
                    ("q", query),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;
        Ok(response
            .items
            .into_iter()
            .filter_map(SearchResult::into_channel_hit)
            .collect())
    }

    fn name(&self) -> &'static str {
        "youtube-data-api-v3"
    }
}
