//! ---
//! chm_section: "11-simulation"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Telemetry, maintenance and anomaly record types."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One synthetic reading for one chiller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub time: DateTime<Utc>,
    pub chiller: String,
    /// Outdoor air temperature, °C.
    pub ambient: f64,
    /// Served IT load, % of design.
    pub it_load: f64,
    /// Chilled-water inlet temperature, °C.
    pub chw_in: f64,
    /// Expected power draw, kW.
    pub power_predicted: f64,
    /// Measured power draw, kW.
    pub power_actual: f64,
    /// Signed relative deviation of actual against predicted power.
    pub anomaly_score: f64,
}

/// Maintenance urgency bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub chiller: String,
    /// Days until the next maintenance job.
    pub due_days: u32,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub chiller: String,
    /// Anomalies recorded over the simulated window.
    pub count: u32,
}
