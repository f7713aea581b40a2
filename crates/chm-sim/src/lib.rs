//! ---
//! chm_section: "11-simulation"
//! chm_subsection: "01-bootstrap"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Simulation module exports and shared types."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
//! Synthetic chiller telemetry, per-chiller maintenance and anomaly summaries,
//! the column-aware dataset they are served through, and derived KPIs.

pub mod analytics;
pub mod dataset;
pub mod frames;
pub mod generator;
pub mod snapshot;

pub use analytics::{anomaly_histogram, HealthKpis, HistogramBin};
pub use dataset::{Column, DatasetError, TelemetryDataset, TelemetryRow};
pub use frames::{AnomalySummary, MaintenanceRecord, Priority, TelemetrySample};
pub use generator::{
    anomaly_score, baseline_power, FleetSimulator, SAMPLES_PER_DAY, SAMPLE_INTERVAL_MINUTES,
};
pub use snapshot::{FleetSnapshot, SnapshotCache};
