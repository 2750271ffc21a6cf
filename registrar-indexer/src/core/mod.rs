//! Core - configuration and startup
//!
//! - [`Config`] - environment-driven configuration
//! - [`build_gateway`] - deed lookup backend selected by the configuration
//! - [`replay`] - feed → manager loop

pub mod config;
pub mod replay;

pub use config::{Config, ConfigError, GatewaySource};
pub use replay::{ReplayError, ReplaySummary, replay};

use crate::projection::{ContractGateway, JsonRpcGateway, StaticGateway};
use std::sync::Arc;

/// Build the contract gateway the configuration asks for
pub fn build_gateway(config: &Config) -> anyhow::Result<Arc<dyn ContractGateway>> {
    let gateway: Arc<dyn ContractGateway> = match config.gateway_source()? {
        GatewaySource::Rpc(url) => {
            tracing::info!(url = %url, "Using JSON-RPC deed gateway");
            Arc::new(JsonRpcGateway::new(url)?)
        }
        GatewaySource::DeedMap(path) => {
            let gateway = StaticGateway::from_json_file(&path)?;
            tracing::info!(path = %path.display(), deeds = gateway.len(), "Using static deed map");
            Arc::new(gateway)
        }
    };
    Ok(gateway)
}
