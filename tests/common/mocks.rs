//! wiremock setups for the YouTube Data API endpoints

use super::config::TEST_API_KEY;
use super::fixtures::*;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `channels.list?id=<CHANNEL_ID>` answering with the test channel
pub async fn mount_channel_by_id(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("id", CHANNEL_ID))
        .and(header("x-goog-api-key", TEST_API_KEY))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(channel_response(
                CHANNEL_ID,
                CHANNEL_TITLE,
                UPLOADS_PLAYLIST,
            )),
        )
        .mount(server)
        .await;
}

/// `channels.list?forHandle=<handle>` answering with the test channel
pub async fn mount_channel_by_handle(server: &MockServer, handle: &str) {
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("forHandle", handle))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(channel_response(
                CHANNEL_ID,
                CHANNEL_TITLE,
                UPLOADS_PLAYLIST,
            )),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Serve `videos` from the uploads playlist in pages of 50
pub async fn mount_uploads(server: &MockServer, videos: &[VideoFixture]) {
    let ids: Vec<String> = videos.iter().map(|v| v.id.clone()).collect();
    let pages: Vec<&[String]> = if ids.is_empty() {
        vec![&[] as &[String]]
    } else {
        ids.chunks(50).collect()
    };

    for (index, page) in pages.iter().enumerate() {
        let next = (index + 1 < pages.len()).then(|| format!("page-{}", index + 1));
        let body = playlist_page(page, next.as_deref(), ids.len());

        let mock = Mock::given(method("GET"))
            .and(path("/youtube/v3/playlistItems"))
            .and(query_param("playlistId", UPLOADS_PLAYLIST));
        let mock = if index == 0 {
            mock.and(query_param_is_missing("pageToken"))
        } else {
            mock.and(query_param("pageToken", format!("page-{}", index)))
        };
        mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }
}

/// Serve `videos.list` for each 50-ID chunk of `requested`
///
/// Only IDs present in `existing` are returned.
pub async fn mount_video_batches(
    server: &MockServer,
    requested: &[VideoFixture],
    existing: &[VideoFixture],
) {
    for chunk in requested.chunks(50) {
        let joined = chunk
            .iter()
            .map(|v| v.id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let returned: Vec<VideoFixture> = chunk
            .iter()
            .filter(|v| existing.iter().any(|e| e.id == v.id))
            .cloned()
            .collect();

        Mock::given(method("GET"))
            .and(path("/youtube/v3/videos"))
            .and(query_param("id", joined))
            .respond_with(ResponseTemplate::new(200).set_body_json(videos_response(&returned)))
            .mount(server)
            .await;
    }
}

/// Mount the whole happy path for the test channel, resolved by ID
pub async fn mount_channel_with_videos(server: &MockServer, videos: &[VideoFixture]) {
    mount_channel_by_id(server).await;
    mount_uploads(server, videos).await;
    mount_video_batches(server, videos, videos).await;
}
