//! Registrar indexer - projects auction registrar events into queryable state
//!
//! # Module structure
//!
//! ```text
//! registrar-indexer/src/
//! ├── core/          # configuration, gateway selection, replay loop
//! ├── projection/    # appliers, manager, storage, stats, gateway, feed
//! └── utils/         # logging
//! ```

pub mod core;
pub mod projection;
pub mod utils;

pub use self::core::{Config, ReplaySummary, replay};
pub use projection::{EntityStorage, ProcessOutcome, ProjectionManager};
pub use utils::logger::{cleanup_old_logs, init_logger_with_file};

/// Load `.env` and make sure the work directory exists
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    Ok(config)
}
