use anyhow::Context;
use registrar_indexer::core::build_gateway;
use registrar_indexer::{ProjectionManager, cleanup_old_logs, init_logger_with_file, replay};
use std::io::{BufReader, stdin};

fn main() -> anyhow::Result<()> {
    // 1. Environment (.env, work dir) and configuration
    let config = registrar_indexer::setup_environment()?;

    // 2. Logging
    let log_dir = config.log_dir();
    init_logger_with_file(&config.log_level, config.log_json, log_dir.to_str())?;
    if let Err(e) = cleanup_old_logs(&log_dir, config.log_retention_days) {
        tracing::warn!(error = %e, "Failed to clean up old logs");
    }

    tracing::info!(environment = %config.environment, "Registrar indexer starting");

    // 3. Projection
    let gateway = build_gateway(&config)?;
    let db_path = config.db_path();
    let manager = ProjectionManager::new(&db_path, gateway)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    // 4. Replay
    let result = match &config.event_file {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open event file {}", path))?;
            tracing::info!(file = %path, "Replaying event file");
            replay(&manager, BufReader::new(file))
        }
        None => {
            tracing::info!("Replaying events from stdin");
            replay(&manager, stdin().lock())
        }
    };

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, cursor = ?manager.get_cursor().ok().flatten(), "Replay halted");
            return Err(e.into());
        }
    };

    // 5. Summary
    let stats = manager.get_stats()?;
    tracing::info!(
        applied = summary.applied,
        duplicates = summary.duplicates,
        cursor = ?manager.get_cursor()?,
        num_auctioned = stats.num_auctioned,
        num_of_deeds = stats.num_of_deeds,
        num_finalised = stats.num_finalised,
        num_released = stats.num_released,
        num_forbidden = stats.num_forbidden,
        num_transferred = stats.num_transferred,
        num_closed = stats.num_closed,
        accum_value = %stats.accum_value,
        current_value = %stats.current_value,
        "Replay complete"
    );

    Ok(())
}
