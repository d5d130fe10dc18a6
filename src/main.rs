use anyhow::{Context, Result};
use panel_bridge::accessory::AccessoryContext;
use panel_bridge::bridge::{self, Bridge};
use panel_bridge::config::{load_config, BridgeConfig};
use panel_bridge::device::DeviceId;
use panel_bridge::message::Inbound;
use panel_bridge::registry::DeviceSet;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "panel_bridge=info".into()),
        )
        .init();

    info!("Panel bridge starting...");

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PANEL_BRIDGE_CONFIG").ok());
    let config = match config_path {
        Some(path) => load_config(&path)?,
        None => BridgeConfig::default(),
    };
    let config = Arc::new(config);

    let system_panel_id = std::env::var("PANEL_BRIDGE_PANEL_ID")
        .ok()
        .map(|id| DeviceId::from(id.as_str()));
    if system_panel_id.is_none() {
        warn!("PANEL_BRIDGE_PANEL_ID not set, panel status messages will not be redirected");
    }

    let cached = match std::env::var("PANEL_BRIDGE_ACCESSORY_CACHE") {
        Ok(path) => load_cached_accessories(&path)?,
        Err(_) => Vec::new(),
    };

    let set = DeviceSet::new(config.clone(), system_panel_id);
    let mut updates = set.subscribe();
    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) => info!(
                    device_id = %update.device_id,
                    name = %update.name,
                    state = ?update.state,
                    battery = ?update.battery,
                    complete = update.complete,
                    "Device updated"
                ),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Update log lagged, skipped updates");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let (tx, rx) = bridge::channel(&config);
    let runner = tokio::spawn(Bridge::new(set, cached).run(rx));

    // One JSON-encoded snapshot or message per line
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Inbound>(line) {
            Ok(inbound) => {
                if tx.send(inbound).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!(error = %e, "Skipping malformed input line"),
        }
    }
    drop(tx);

    let bridge = runner.await.context("Bridge task failed")?;
    info!(devices = bridge.device_set().len(), "Panel bridge stopped");

    Ok(())
}

/// Accessory contexts persisted by the accessory host, as a JSON array
fn load_cached_accessories(path: &str) -> Result<Vec<AccessoryContext>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read accessory cache {}", path))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse accessory cache {}", path))
}
