//! The analysis entry point
//!
//! [`ViewStatsAnalyzer`] chains the pipeline stages for one request:
//! resolve the reference, fetch channel metadata, enumerate uploads, fetch
//! details, aggregate. Stages run sequentially on the caller's runtime.

use crate::aggregator::aggregate;
use crate::api::{HttpYouTubeApi, YouTubeApi};
use crate::batcher::fetch_video_records;
use crate::config::Config;
use crate::enumerator::{enumerate_uploads, fetch_channel_info};
use crate::error::Result;
use crate::report::{ReportSink, XlsxReportEmitter};
use crate::resolver::{ChannelReference, resolve_channel};
use crate::retry::RetryGovernor;
use crate::types::{ApiKey, ChannelAnalysis, Event, VideoCount};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Retrieves and aggregates a channel's view-count history
///
/// Cheap to clone; clones share the API client, the configuration, and the
/// event channel.
#[derive(Clone)]
pub struct ViewStatsAnalyzer {
    api: Arc<dyn YouTubeApi>,
    config: Arc<Config>,
    governor: RetryGovernor,
    event_tx: broadcast::Sender<Event>,
}

impl std::fmt::Debug for ViewStatsAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewStatsAnalyzer")
            .field("api", &self.api.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ViewStatsAnalyzer {
    /// Create an analyzer talking to the YouTube Data API with `key`
    ///
    /// # Errors
    /// Returns [`Error::Config`](crate::Error::Config) if the configuration
    /// is invalid or the HTTP client cannot be built.
    pub fn new(config: Config, key: ApiKey) -> Result<Self> {
        let api = HttpYouTubeApi::new(&config.api, key)?;
        Self::with_api(config, Arc::new(api))
    }

    /// Create an analyzer over any [`YouTubeApi`] implementation
    pub fn with_api(config: Config, api: Arc<dyn YouTubeApi>) -> Result<Self> {
        config.validate()?;

        // Subscribers that fall more than 1000 events behind see RecvError::Lagged
        let (event_tx, _rx) = broadcast::channel(1000);
        let governor = RetryGovernor::new(config.retry.clone()).with_events(event_tx.clone());

        Ok(Self {
            api,
            config: Arc::new(config),
            governor,
            event_tx,
        })
    }

    /// Subscribe to progress events
    ///
    /// Every subscriber receives every event emitted after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The configuration in effect
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    fn emit_event(&self, event: Event) {
        // No subscribers is fine
        self.event_tx.send(event).ok();
    }

    /// Retrieve and aggregate the view history of a channel
    ///
    /// `reference` is any supported channel URL or a bare ID/handle. At most
    /// `count` of the most recent uploads are analyzed.
    ///
    /// # Errors
    /// Every pipeline error propagates unchanged. A
    /// [`PartialBatchFailure`](crate::Error::PartialBatchFailure) carries the
    /// records fetched before the failing batch.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use yt_view_stats::{ApiKey, Config, VideoCount, ViewStatsAnalyzer};
    ///
    /// # async fn example() -> yt_view_stats::Result<()> {
    /// let analyzer = ViewStatsAnalyzer::new(Config::default(), ApiKey::new("AIza...")?)?;
    /// let analysis = analyzer
    ///     .analyze("https://www.youtube.com/@GoogleDevelopers", VideoCount::All)
    ///     .await?;
    /// println!("{} videos, {} views", analysis.series.len(), analysis.series.total_views());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn analyze(&self, reference: &str, count: VideoCount) -> Result<ChannelAnalysis> {
        self.emit_event(Event::Resolving {
            reference: reference.to_string(),
        });

        match self.run(reference, count).await {
            Ok(analysis) => {
                info!(
                    channel_id = %analysis.channel.id,
                    title = %analysis.channel.title,
                    videos = analysis.series.len(),
                    total_views = analysis.series.total_views(),
                    "analysis completed"
                );
                self.emit_event(Event::Completed {
                    title: analysis.channel.title.clone(),
                    videos: analysis.series.len(),
                });
                Ok(analysis)
            }
            Err(e) => {
                error!(reference, code = e.error_code(), error = %e, "analysis failed");
                self.emit_event(Event::Failed {
                    code: e.error_code().to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run(&self, reference: &str, count: VideoCount) -> Result<ChannelAnalysis> {
        let api = self.api.as_ref();
        let governor = &self.governor;

        let parsed = ChannelReference::parse(reference)?;
        let channel_id = resolve_channel(api, governor, &parsed, &self.config.resolver).await?;
        let channel = fetch_channel_info(api, governor, &channel_id).await?;
        self.emit_event(Event::ChannelResolved {
            channel_id: channel.id.clone(),
            title: channel.title.clone(),
        });

        let ids = enumerate_uploads(api, governor, &channel.uploads_playlist, count, |page, collected| {
            self.emit_event(Event::PageFetched { page, collected })
        })
        .await?;

        let records = fetch_video_records(api, governor, &ids, |batch, total, records| {
            self.emit_event(Event::BatchFetched {
                batch,
                total,
                records,
            })
        })
        .await?;

        let series = aggregate(records, self.config.aggregation.rolling_window);

        Ok(ChannelAnalysis {
            channel,
            requested: count,
            series,
        })
    }

    /// Write the analysis as an XLSX workbook into `report.output_dir`
    pub fn write_report(&self, analysis: &ChannelAnalysis) -> Result<PathBuf> {
        Ok(XlsxReportEmitter::from_config(&self.config.report).emit(analysis)?)
    }
}
