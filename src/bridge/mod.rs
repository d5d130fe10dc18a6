// Cooperative runtime around the device registry

use crate::accessory::{
    create_device_accessory, reconcile_accessories, AccessoryContext, AccessoryPlan, DeviceKind,
};
use crate::config::BridgeConfig;
use crate::message::{parse_timestamp, Inbound, SystemSnapshot};
use crate::registry::DeviceSet;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, error, info, trace, warn};

#[cfg(test)]
mod tests;

/// Owns the device registry and applies inbound items one at a time
pub struct Bridge {
    set: DeviceSet,

    /// Accessory contexts restored from the accessory cache
    cached: Vec<AccessoryContext>,

    /// Set once the first snapshot has bootstrapped accessories
    plan: Option<AccessoryPlan>,
}

impl Bridge {
    pub fn new(set: DeviceSet, cached: Vec<AccessoryContext>) -> Self {
        Self {
            set,
            cached,
            plan: None,
        }
    }

    pub fn device_set(&self) -> &DeviceSet {
        &self.set
    }

    pub fn into_device_set(self) -> DeviceSet {
        self.set
    }

    /// Accessory plan chosen at bootstrap
    pub fn plan(&self) -> Option<&AccessoryPlan> {
        self.plan.as_ref()
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.plan.is_some()
    }

    /// Create accessories for the snapshot's devices, reconcile them with the
    /// cached ones and bind everything that survives.
    pub fn bootstrap(&mut self, snapshot: &SystemSnapshot) -> Result<()> {
        let config = self.set.config().clone();
        let created: Vec<AccessoryContext> = snapshot
            .devices
            .iter()
            .filter_map(|data| create_device_accessory(data, &config))
            .collect();

        let plan = reconcile_accessories(self.cached.clone(), created);

        for context in &plan.removed {
            info!(device_id = %context.id, name = %context.name, "Removing accessory for vanished device");
        }

        for context in plan.to_bind() {
            self.set
                .bind_accessory(context, None)
                .with_context(|| format!("Failed to bind accessory for device {}", context.id))?;

            if config.show_camera_config && context.device_class_name == DeviceKind::Camera.class_name() {
                info!(
                    device_id = %context.id,
                    name = %context.name,
                    category = ?context.category,
                    "Camera accessory"
                );
            }
        }

        info!(
            retained = plan.retained.len(),
            added = plan.added.len(),
            removed = plan.removed.len(),
            "Accessories bootstrapped"
        );

        self.plan = Some(plan);
        Ok(())
    }

    /// Apply one inbound snapshot or message
    pub fn ingest(&mut self, inbound: Inbound) -> Result<()> {
        match inbound {
            Inbound::Snapshot { snapshot, timestamp } => {
                let timestamp =
                    parse_timestamp(&timestamp).context("Snapshot carries an unusable timestamp")?;

                if !self.is_bootstrapped() {
                    self.bootstrap(&snapshot)?;
                }

                let updated = self.set.handle_snapshot(snapshot, timestamp)?;
                debug!(updated, "Snapshot applied");
            }
            Inbound::Message { message } => {
                let outcome = self.set.handle_message(message)?;
                trace!(?outcome, "Message handled");
            }
        }
        Ok(())
    }

    /// Drain `rx` until every sender is gone, then hand the bridge back.
    ///
    /// Errors from individual items are logged and do not stop the loop.
    pub async fn run(mut self, mut rx: mpsc::Receiver<Inbound>) -> Self {
        info!(devices = self.set.len(), "Bridge started");

        while let Some(inbound) = rx.recv().await {
            if let Err(e) = self.ingest(inbound) {
                error!(error = format!("{:#}", e), "Failed to ingest update");
            }
        }

        info!("Inbound channel closed, bridge stopping");
        self
    }
}

/// Inbound channel sized from configuration
pub fn channel(config: &BridgeConfig) -> (mpsc::Sender<Inbound>, mpsc::Receiver<Inbound>) {
    mpsc::channel(config.channel_capacity.max(1))
}

/// Poll `fetch` every `period` and forward each snapshot to the bridge.
///
/// Fetch errors are logged and retried on the next tick. Returns once the
/// bridge side of the channel is gone.
pub async fn run_snapshot_refresh<F, Fut>(period: Duration, tx: mpsc::Sender<Inbound>, mut fetch: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(SystemSnapshot, DateTime<Utc>)>>,
{
    info!(period_secs = period.as_secs(), "Starting snapshot refresh");

    let mut timer = interval(period);

    loop {
        timer.tick().await;

        match fetch().await {
            Ok((snapshot, timestamp)) => {
                if tx.send(Inbound::snapshot(snapshot, timestamp)).await.is_err() {
                    info!("Bridge stopped, ending snapshot refresh");
                    return;
                }
            }
            Err(e) => warn!(error = %e, "Snapshot refresh failed"),
        }
    }
}
