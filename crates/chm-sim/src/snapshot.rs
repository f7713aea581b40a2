//! ---
//! chm_section: "11-simulation"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Session snapshot of simulated fleet data and its keyed cache."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chm_common::config::AppConfig;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::dataset::TelemetryDataset;
use crate::frames::{AnomalySummary, MaintenanceRecord};
use crate::generator::FleetSimulator;

/// Everything the dashboard views read, generated together from one configuration.
#[derive(Debug, Clone)]
pub struct FleetSnapshot {
    pub fingerprint: String,
    pub generated_at: DateTime<Utc>,
    pub chillers: Vec<String>,
    pub telemetry: TelemetryDataset,
    pub anomalies: Vec<AnomalySummary>,
    pub maintenance: Vec<MaintenanceRecord>,
}

impl FleetSnapshot {
    pub fn generate(config: &AppConfig) -> Result<Self> {
        let fingerprint = config
            .simulation_fingerprint()
            .context("unable to fingerprint simulation configuration")?;
        Ok(Self::generate_at(config, fingerprint, Utc::now()))
    }

    fn generate_at(config: &AppConfig, fingerprint: String, now: DateTime<Utc>) -> Self {
        let mut simulator = FleetSimulator::from_config(&config.simulation);
        let samples =
            simulator.simulate_timeseries_at(&config.chillers, config.simulation.days, now);
        let anomalies = simulator.simulate_anomaly_summary(&config.chillers);
        let maintenance = simulator.simulate_maintenance(&config.chillers);
        info!(
            fingerprint = %fingerprint,
            chillers = config.chillers.len(),
            samples = samples.len(),
            "fleet snapshot generated"
        );
        Self {
            fingerprint,
            generated_at: now,
            chillers: config.chillers.clone(),
            telemetry: TelemetryDataset::from_samples(&samples),
            anomalies,
            maintenance,
        }
    }
}

/// Per-session cache so every view and explanation sees the same snapshot.
///
/// Keyed by [`AppConfig::simulation_fingerprint`]; entries live as long as the cache.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: Mutex<HashMap<String, Arc<FleetSnapshot>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_generate(&self, config: &AppConfig) -> Result<Arc<FleetSnapshot>> {
        let fingerprint = config
            .simulation_fingerprint()
            .context("unable to fingerprint simulation configuration")?;
        let mut entries = self.entries.lock();
        if let Some(snapshot) = entries.get(&fingerprint) {
            debug!(fingerprint = %fingerprint, "snapshot cache hit");
            return Ok(Arc::clone(snapshot));
        }
        let snapshot = Arc::new(FleetSnapshot::generate_at(
            config,
            fingerprint.clone(),
            Utc::now(),
        ));
        entries.insert(fingerprint, Arc::clone(&snapshot));
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
