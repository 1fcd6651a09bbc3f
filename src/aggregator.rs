//! Time-series aggregation of video records

use crate::config::RollingWindow;
use crate::types::{AggregatedSeries, VideoRecord};
use std::collections::HashSet;
use tracing::debug;

/// Build the chronological series with its rolling average
///
/// Duplicate video IDs keep their first occurrence. Records are then sorted
/// ascending by publish time; equal timestamps keep their input order.
pub fn aggregate(records: Vec<VideoRecord>, window: RollingWindow) -> AggregatedSeries {
    let input_len = records.len();
    let mut seen = HashSet::with_capacity(input_len);
    let mut records: Vec<VideoRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.video_id.clone()))
        .collect();

    // sort_by_key is stable
    records.sort_by_key(|r| r.published_at);

    let window = window.resolve(records.len());
    let views: Vec<u64> = records.iter().map(|r| r.view_count).collect();
    let rolling_average = rolling_mean(&views, window);

    debug!(
        input = input_len,
        duplicates = input_len - records.len(),
        window,
        "aggregated series"
    );

    AggregatedSeries {
        records,
        rolling_average,
        window,
    }
}

/// Trailing mean over `window` values
///
/// Position `i` averages `values[i + 1 - w ..= i]` with `w = min(window, i + 1)`,
/// so the first `window - 1` positions use a shorter window. A window of
/// zero is treated as one.
pub fn rolling_mean(values: &[u64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut sum: u128 = 0;

    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            sum += u128::from(value);
            if i >= window {
                sum -= u128::from(values[i - window]);
            }
            let len = (i + 1).min(window);
            sum as f64 / len as f64
        })
        .collect()
}
