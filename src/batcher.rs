//! Detail batching
//!
//! `videos.list` accepts at most 50 IDs per call, so the ID sequence is split
//! into chunks that are fetched one after another.

use crate::api::{MAX_RESULTS_PER_PAGE, VideoResource, YouTubeApi, operation};
use crate::error::{Error, PartialBatch, Result};
use crate::retry::RetryGovernor;
use crate::types::{VideoId, VideoRecord};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Fetch title, publish time, and view count for every ID
///
/// IDs the API does not return (deleted or private videos) are dropped.
/// Records come back in request order. `on_batch` is called after each
/// batch with the 1-based batch number, the batch total, and the number of
/// records collected so far.
///
/// # Errors
/// - A failure in the first batch is returned unchanged.
/// - A failure in a later batch becomes [`Error::PartialBatchFailure`]
///   carrying the records of the batches that completed.
/// - A returned video with an unparseable `publishedAt` or `viewCount` is
///   an [`Error::FatalApi`].
pub async fn fetch_video_records<B>(
    api: &dyn YouTubeApi,
    governor: &RetryGovernor,
    ids: &[VideoId],
    mut on_batch: B,
) -> Result<Vec<VideoRecord>>
where
    B: FnMut(usize, usize, usize),
{
    let chunk_size = MAX_RESULTS_PER_PAGE as usize;
    let total_batches = ids.len().div_ceil(chunk_size);
    let mut records = Vec::with_capacity(ids.len());

    for (index, chunk) in ids.chunks(chunk_size).enumerate() {
        let batch = index + 1;
        match fetch_batch(api, governor, chunk).await {
            Ok(mut fetched) => {
                let dropped = chunk.len() - fetched.len();
                if dropped > 0 {
                    debug!(batch, dropped, "videos missing from detail response");
                }
                records.append(&mut fetched);
                debug!(batch, total_batches, records = records.len(), "fetched detail batch");
                on_batch(batch, total_batches, records.len());
            }
            Err(e) if index == 0 => return Err(e),
            Err(e) => {
                warn!(
                    batch,
                    total_batches,
                    kept = records.len(),
                    error = %e,
                    "detail batch failed, returning partial results"
                );
                return Err(Error::PartialBatchFailure {
                    partial: Box::new(PartialBatch {
                        records,
                        completed_batches: index,
                        total_batches,
                    }),
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(records)
}

async fn fetch_batch(
    api: &dyn YouTubeApi,
    governor: &RetryGovernor,
    chunk: &[VideoId],
) -> Result<Vec<VideoRecord>> {
    let resources = governor
        .call(operation::VIDEOS_LIST, || api.list_videos(chunk))
        .await?;

    let mut by_id: HashMap<String, VideoResource> = resources
        .into_iter()
        .map(|video| (video.id.clone(), video))
        .collect();

    chunk
        .iter()
        .filter_map(|id| by_id.remove(id.as_str()))
        .map(to_record)
        .collect()
}

/// Convert one API video into a record
fn to_record(video: VideoResource) -> Result<VideoRecord> {
    let snippet = video.snippet.ok_or_else(|| {
        Error::malformed(
            operation::VIDEOS_LIST,
            format!("video {} has no snippet", video.id),
        )
    })?;

    let published_at = DateTime::parse_from_rfc3339(&snippet.published_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            Error::malformed(
                operation::VIDEOS_LIST,
                format!(
                    "video {} has invalid publishedAt {:?}: {}",
                    video.id, snippet.published_at, e
                ),
            )
        })?;

    // Hidden statistics omit viewCount
    let view_count = match video.statistics.and_then(|s| s.view_count) {
        None => 0,
        Some(raw) => raw.parse::<u64>().map_err(|_| {
            Error::malformed(
                operation::VIDEOS_LIST,
                format!("video {} has invalid viewCount {:?}", video.id, raw),
            )
        })?,
    };

    Ok(VideoRecord {
        video_id: VideoId(video.id),
        title: snippet.title,
        published_at,
        view_count,
    })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{VideoSnippet, VideoStatistics};
    use crate::config::RetryConfig;
    use crate::test_helpers::FakeYouTubeApi;
    use chrono::TimeZone;
    use std::time::Duration;

    fn fast_governor() -> RetryGovernor {
        RetryGovernor::new(RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
            jitter: false,
        })
    }

    fn video_ids(ids: &[&str]) -> Vec<VideoId> {
        ids.iter().map(|id| VideoId::from(*id)).collect()
    }

    fn with_videos(n: usize) -> (FakeYouTubeApi, Vec<VideoId>) {
        let mut api = FakeYouTubeApi::new();
        let mut ids = Vec::new();
        for i in 0..n {
            let id = format!("v{i:03}");
            api = api.with_video(&id, &format!("Video {i}"), "2024-01-01T00:00:00Z", Some(i as u64));
            ids.push(VideoId(id));
        }
        (api, ids)
    }

    #[tokio::test]
    async fn test_missing_videos_are_dropped() {
        let api = FakeYouTubeApi::new()
            .with_video("v1", "One", "2024-01-01T10:00:00Z", Some(10))
            .with_video("v3", "Three", "2024-01-03T10:00:00Z", Some(30));

        let records = fetch_video_records(&api, &fast_governor(), &video_ids(&["v1", "v2", "v3"]), |_, _, _| {})
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].video_id.as_str(), "v1");
        assert_eq!(records[0].view_count, 10);
        assert_eq!(
            records[0].published_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(records[1].video_id.as_str(), "v3");
    }

    #[tokio::test]
    async fn test_hidden_view_count_is_zero() {
        let api = FakeYouTubeApi::new().with_video("v1", "Hidden", "2024-01-01T00:00:00Z", None);

        let records = fetch_video_records(&api, &fast_governor(), &video_ids(&["v1"]), |_, _, _| {})
            .await
            .unwrap();

        assert_eq!(records[0].view_count, 0);
    }

    #[tokio::test]
    async fn test_chunks_of_fifty() {
        let (api, ids) = with_videos(120);
        let mut batches = Vec::new();

        let records = fetch_video_records(&api, &fast_governor(), &ids, |batch, total, collected| {
            batches.push((batch, total, collected))
        })
        .await
        .unwrap();

        assert_eq!(records.len(), 120);
        let sizes: Vec<_> = api.video_requests().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
        assert_eq!(batches, vec![(1, 3, 50), (2, 3, 100), (3, 3, 120)]);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let api = FakeYouTubeApi::new();

        let records = fetch_video_records(&api, &fast_governor(), &[], |_, _, _| {})
            .await
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(api.calls(operation::VIDEOS_LIST), 0);
    }

    #[tokio::test]
    async fn test_first_batch_failure_is_returned_unchanged() {
        let (api, ids) = with_videos(60);
        let api = api.failing(operation::VIDEOS_LIST, 0..1, 404, Some("videoNotFound"));

        let err = fetch_video_records(&api, &fast_governor(), &ids, |_, _, _| {})
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::FatalApi {
                operation: "videos.list",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_later_batch_failure_keeps_partial_records() {
        let (api, ids) = with_videos(120);
        // Second batch fails on both attempts
        let api = api.failing(operation::VIDEOS_LIST, 1..3, 500, None);

        let err = fetch_video_records(&api, &fast_governor(), &ids, |_, _, _| {})
            .await
            .unwrap_err();

        match err {
            Error::PartialBatchFailure { partial, source } => {
                assert_eq!(partial.records.len(), 50);
                assert_eq!(partial.completed_batches, 1);
                assert_eq!(partial.total_batches, 3);
                assert!(matches!(*source, Error::TransientApi { attempts: 2, .. }));
            }
            other => panic!("expected PartialBatchFailure, got {:?}", other),
        }
        assert_eq!(api.calls(operation::VIDEOS_LIST), 3);
    }

    #[tokio::test]
    async fn test_invalid_published_at_is_malformed() {
        let api = FakeYouTubeApi::new().with_video("v1", "Bad date", "yesterday", Some(1));

        let err = fetch_video_records(&api, &fast_governor(), &video_ids(&["v1"]), |_, _, _| {})
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "fatal_api_error");
        assert!(err.to_string().contains("publishedAt"));
    }

    #[tokio::test]
    async fn test_invalid_view_count_is_malformed() {
        let api = FakeYouTubeApi::new().with_raw_video(VideoResource {
            id: "v1".into(),
            snippet: Some(VideoSnippet {
                title: "Bad count".into(),
                published_at: "2024-01-01T00:00:00Z".into(),
            }),
            statistics: Some(VideoStatistics {
                view_count: Some("-3".into()),
            }),
        });

        let err = fetch_video_records(&api, &fast_governor(), &video_ids(&["v1"]), |_, _, _| {})
            .await
            .unwrap_err();

        assert!(err.to_string().contains("viewCount"));
    }

    #[test]
    fn test_to_record_normalizes_offset() {
        let record = to_record(VideoResource {
            id: "v1".into(),
            snippet: Some(VideoSnippet {
                title: "Offset".into(),
                published_at: "2024-01-01T02:00:00+02:00".into(),
            }),
            statistics: None,
        })
        .unwrap();

        assert_eq!(
            record.published_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(record.view_count, 0);
    }
}
