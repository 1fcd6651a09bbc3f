//! YouTube Data API response bodies

use serde_json::{Value, json};

/// Channel ID used throughout the integration tests
pub const CHANNEL_ID: &str = "UC_x5XG1OV2P6uZZ5FSM9Ttw";

/// Uploads playlist of [`CHANNEL_ID`]
pub const UPLOADS_PLAYLIST: &str = "UU_x5XG1OV2P6uZZ5FSM9Ttw";

/// Title of [`CHANNEL_ID`]
pub const CHANNEL_TITLE: &str = "Google for Developers";

/// A test video
#[derive(Clone, Debug)]
pub struct VideoFixture {
    pub id: String,
    pub title: String,
    pub published_at: String,
    /// `None` models hidden statistics
    pub views: Option<u64>,
}

impl VideoFixture {
    pub fn new(id: &str, published_at: &str, views: u64) -> Self {
        Self {
            id: id.to_string(),
            title: format!("Video {id}"),
            published_at: published_at.to_string(),
            views: Some(views),
        }
    }
}

/// `channels.list` body with one channel
pub fn channel_response(id: &str, title: &str, uploads: &str) -> Value {
    json!({
        "kind": "youtube#channelListResponse",
        "pageInfo": { "totalResults": 1, "resultsPerPage": 5 },
        "items": [{
            "kind": "youtube#channel",
            "id": id,
            "snippet": { "title": title, "customUrl": "@googledevelopers" },
            "contentDetails": { "relatedPlaylists": { "likes": "", "uploads": uploads } }
        }]
    })
}

/// `channels.list` body without matches (the API omits "items")
pub fn empty_channel_response() -> Value {
    json!({
        "kind": "youtube#channelListResponse",
        "pageInfo": { "totalResults": 0, "resultsPerPage": 5 }
    })
}

/// `playlistItems.list` body
pub fn playlist_page(ids: &[String], next_page_token: Option<&str>, total: usize) -> Value {
    let items: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "kind": "youtube#playlistItem", "contentDetails": { "videoId": id } }))
        .collect();

    let mut body = json!({
        "kind": "youtube#playlistItemListResponse",
        "pageInfo": { "totalResults": total, "resultsPerPage": 50 },
        "items": items
    });
    if let Some(token) = next_page_token {
        body["nextPageToken"] = json!(token);
    }
    body
}

/// `videos.list` body
pub fn videos_response(videos: &[VideoFixture]) -> Value {
    let items: Vec<Value> = videos
        .iter()
        .map(|v| {
            let statistics = match v.views {
                Some(views) => json!({ "viewCount": views.to_string(), "likeCount": "1" }),
                None => json!({ "likeCount": "1" }),
            };
            json!({
                "kind": "youtube#video",
                "id": v.id,
                "snippet": { "title": v.title, "publishedAt": v.published_at },
                "statistics": statistics
            })
        })
        .collect();

    json!({ "kind": "youtube#videoListResponse", "items": items })
}

/// `search.list` body with one channel hit
pub fn search_response(channel_id: &str, title: &str) -> Value {
    json!({
        "kind": "youtube#searchListResponse",
        "items": [{
            "kind": "youtube#searchResult",
            "id": { "kind": "youtube#channel", "channelId": channel_id },
            "snippet": { "title": title, "channelId": channel_id }
        }]
    })
}

/// Google error envelope
pub fn error_response(code: u16, reason: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message,
            "errors": [{ "message": message, "domain": "youtube", "reason": reason }]
        }
    })
}

/// `count` videos, one per day from 2024-01-01, IDs "v000", "v001", ...
///
/// Views grow with the index, so chronological order equals view order.
pub fn daily_videos(count: usize) -> Vec<VideoFixture> {
    (0..count)
        .map(|i| {
            let day = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .checked_add_days(chrono::Days::new(i as u64))
                .unwrap();
            VideoFixture::new(
                &format!("v{i:03}"),
                &format!("{}T12:00:00Z", day.format("%Y-%m-%d")),
                (i as u64 + 1) * 100,
            )
        })
        .collect()
}
