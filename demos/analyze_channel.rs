//! Analyze a channel and write the XLSX report
//!
//! ```bash
//! YOUTUBE_API_KEY=... cargo run --example analyze_channel -- \
//!     https://www.youtube.com/@GoogleDevelopers 50
//! ```
//!
//! The key may also come from a `.env` file. `RUST_LOG` controls log output
//! (default: `info`).

use tracing_subscriber::EnvFilter;
use yt_view_stats::{ApiKey, Config, Event, VideoCount, ViewStatsAnalyzer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let Some(reference) = args.next() else {
        eprintln!("usage: analyze_channel <channel url|@handle|channel id> [count|all]");
        std::process::exit(2);
    };
    let count: VideoCount = args.next().as_deref().unwrap_or("50").parse()?;

    let key = ApiKey::new(std::env::var("YOUTUBE_API_KEY")?)?;
    let analyzer = ViewStatsAnalyzer::new(Config::default(), key)?;

    // Progress subscriber
    let mut events = analyzer.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::ChannelResolved { title, .. } => println!("Found channel: {}", title),
                Event::PageFetched { page, collected } => {
                    println!("Page {}: {} videos listed", page, collected)
                }
                Event::BatchFetched { batch, total, .. } => {
                    println!("Details batch {}/{}", batch, total)
                }
                Event::Retrying {
                    operation, delay_ms, ..
                } => println!("{} throttled, retrying in {} ms", operation, delay_ms),
                _ => {}
            }
        }
    });

    let analysis = match analyzer.analyze(&reference, count).await {
        Ok(analysis) => analysis,
        Err(e) => {
            if let Some(partial) = e.partial_records() {
                eprintln!("Stopped early; {} videos were fetched before the failure", partial.len());
            }
            return Err(e.into());
        }
    };

    let series = &analysis.series;
    println!(
        "{}: {} videos, {} total views",
        analysis.channel.title,
        series.len(),
        series.total_views()
    );
    if let (Some(first), Some(last)) = (series.first_published(), series.last_published()) {
        println!("Uploads from {} to {}", first.date_naive(), last.date_naive());
    }

    if series.is_empty() {
        println!("Channel has no public uploads, no report written");
        return Ok(());
    }

    let path = analyzer.write_report(&analysis)?;
    println!("Report written to {}", path.display());

    Ok(())
}
