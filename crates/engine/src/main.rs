use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use domain::models::{PositionReport, TripSource};
use domain::services::LogEventSink;
use persistence::repositories::{
    GeofenceEventRepository, GeofenceStatusRepository, TripRepository, ZoneRepository,
};
use telemetry_engine::config::Config;
use telemetry_engine::pipeline::Pipeline;
use telemetry_engine::telemetry::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting fleet telemetry engine v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let db_config = persistence::db::DatabaseConfig::from(&config.database);
    let pool = db_config.connect().await?;

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let replay_mode = std::env::args().any(|arg| arg == "--replay");
    let source = if replay_mode {
        TripSource::Backfill
    } else {
        TripSource::Stream
    };

    let pipeline = Pipeline::new(
        config.engine.clone(),
        source,
        Arc::new(TripRepository::new(pool.clone())),
        Arc::new(ZoneRepository::new(pool.clone())),
        Arc::new(GeofenceStatusRepository::new(pool.clone())),
        Arc::new(GeofenceEventRepository::new(pool)),
        Arc::new(LogEventSink),
    );

    // Position reports arrive as NDJSON on stdin, one report per line.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if replay_mode {
        let mut reports = Vec::new();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<PositionReport>(&line) {
                Ok(report) => reports.push(report),
                Err(err) => warn!(error = %err, "skipping malformed report line"),
            }
        }
        let summary = pipeline.replay(reports, Utc::now()).await?;
        info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            trips = summary.trips_closed,
            crossings = summary.crossings,
            speed_alerts = summary.speed_alerts,
            "replay finished"
        );
        return Ok(());
    }

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let report: PositionReport = match serde_json::from_str(&line) {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "skipping malformed report line");
                continue;
            }
        };
        if let Err(err) = pipeline.process(&report, Utc::now()).await {
            warn!(device_id = %report.device_id, error = %err, "failed to process report");
        }
    }

    // Stream ended: close whatever is still open at its last known point.
    let closed = pipeline.flush().await?;
    info!(trips = closed.len(), "flushed open trips on shutdown");

    Ok(())
}
