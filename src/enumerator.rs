//! Upload enumeration
//!
//! A channel's uploads live in a playlist whose ID is part of the channel
//! metadata. The playlist is read page by page, newest first, until it runs
//! out or the requested number of videos is collected.

use crate::api::{ChannelLookup, MAX_RESULTS_PER_PAGE, YouTubeApi, operation};
use crate::error::{Error, Result};
use crate::retry::RetryGovernor;
use crate::types::{ChannelId, ChannelInfo, VideoCount, VideoId};
use tracing::{debug, info, warn};

/// Fetch the title and uploads playlist of a channel
///
/// # Errors
/// - [`Error::ChannelNotFound`] if the ID matches no channel
/// - [`Error::FatalApi`] if the channel carries no uploads playlist or title
pub async fn fetch_channel_info(
    api: &dyn YouTubeApi,
    governor: &RetryGovernor,
    channel_id: &ChannelId,
) -> Result<ChannelInfo> {
    let lookup = ChannelLookup::ById(channel_id.clone());
    let channels = governor
        .call(operation::CHANNELS_LIST, || api.list_channels(&lookup))
        .await?;

    let channel = channels
        .into_iter()
        .next()
        .ok_or_else(|| Error::ChannelNotFound(channel_id.to_string()))?;

    let uploads_playlist = channel.uploads_playlist().map(str::to_string).ok_or_else(|| {
        Error::malformed(
            operation::CHANNELS_LIST,
            format!("channel {} has no uploads playlist", channel_id),
        )
    })?;
    let title = channel.title().map(str::to_string).ok_or_else(|| {
        Error::malformed(
            operation::CHANNELS_LIST,
            format!("channel {} has no snippet", channel_id),
        )
    })?;

    info!(channel_id = %channel_id, title = %title, uploads = %uploads_playlist, "fetched channel info");

    Ok(ChannelInfo {
        id: channel_id.clone(),
        title,
        uploads_playlist,
    })
}

/// Pagination state of one enumeration
enum PageState {
    /// Nothing fetched yet
    Start,
    /// More pages behind this cursor
    HasMore(String),
    /// No further pages
    Exhausted,
}

/// Collect up to `count` video IDs from an uploads playlist, newest first
///
/// Pages are requested at the API maximum of 50 items. `on_page` is called
/// after each page with the 1-based page number and the number of IDs
/// collected so far.
///
/// The result keeps playlist order and never holds more than `count` IDs.
/// A continuation token equal to the one just used ends the loop.
pub async fn enumerate_uploads<P>(
    api: &dyn YouTubeApi,
    governor: &RetryGovernor,
    playlist_id: &str,
    count: VideoCount,
    mut on_page: P,
) -> Result<Vec<VideoId>>
where
    P: FnMut(usize, usize),
{
    let mut ids: Vec<VideoId> = Vec::with_capacity(count.limit().unwrap_or(0).min(1024));
    let mut state = PageState::Start;
    let mut page = 0;
    let mut reported_total = None;

    loop {
        let cursor = match state {
            PageState::Start => None,
            PageState::HasMore(token) => Some(token),
            PageState::Exhausted => break,
        };

        page += 1;
        let result = governor
            .call(operation::PLAYLIST_ITEMS_LIST, || {
                api.list_playlist_items(playlist_id, cursor.as_deref(), MAX_RESULTS_PER_PAGE)
            })
            .await?;

        reported_total = result.total_results.or(reported_total);
        ids.extend(result.video_ids);
        if let Some(limit) = count.limit() {
            ids.truncate(limit);
        }
        debug!(playlist_id, page, collected = ids.len(), "fetched uploads page");
        on_page(page, ids.len());

        if count.is_reached(ids.len()) {
            break;
        }

        state = match result.next_page_token {
            None => PageState::Exhausted,
            Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                warn!(playlist_id, page, token = %next, "page token did not advance, stopping");
                PageState::Exhausted
            }
            Some(next) => PageState::HasMore(next),
        };
    }

    if let Some(total) = shortfall(count, ids.len(), reported_total) {
        warn!(
            playlist_id,
            collected = ids.len(),
            reported_total = total,
            "uploads playlist ended before its reported total"
        );
    }

    info!(playlist_id, pages = page, videos = ids.len(), requested = %count, "enumerated uploads");
    Ok(ids)
}

/// The reported playlist size, if a full enumeration collected fewer IDs
fn shortfall(count: VideoCount, collected: usize, reported_total: Option<u64>) -> Option<u64> {
    reported_total.filter(|&total| count == VideoCount::All && (collected as u64) < total)
}
