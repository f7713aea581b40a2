//! ---
//! chm_section: "11-simulation"
//! chm_subsection: "tests"
//! chm_type: "source"
//! chm_scope: "test"
//! chm_description: "Integration tests for simulation output and dataset persistence."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use std::fs;

use anyhow::Result;
use chm_sim::{Column, FleetSimulator, Priority, TelemetryDataset, SAMPLES_PER_DAY};
use chrono::Duration;
use tempfile::tempdir;

const FLEET: [&str; 4] = ["CH-1", "CH-2", "CH-3", "CH-4"];

#[test]
fn default_week_has_expected_shape() {
    let mut simulator = FleetSimulator::from_entropy();
    let samples = simulator.simulate_timeseries(&FLEET, 7);
    assert_eq!(samples.len(), FLEET.len() * 7 * SAMPLES_PER_DAY as usize);

    for chiller in FLEET {
        let series: Vec<_> = samples.iter().filter(|s| s.chiller == chiller).collect();
        assert_eq!(series.len(), 7 * 96);
        assert!(series
            .windows(2)
            .all(|pair| pair[1].time - pair[0].time == Duration::minutes(15)));
        for sample in series {
            assert!(sample.power_predicted > 0.0 && sample.power_actual > 0.0);
            assert_eq!(
                sample.anomaly_score,
                (sample.power_actual - sample.power_predicted) / sample.power_predicted.max(1.0)
            );
        }
    }
}

#[test]
fn single_chiller_maintenance_scenario() {
    let mut simulator = FleetSimulator::from_entropy();
    let records = simulator.simulate_maintenance(&["CH-1"]);
    assert_eq!(records.len(), 1);
    assert!((5..=180).contains(&records[0].due_days));
    assert!(["Low", "Medium", "High"].contains(&records[0].priority.to_string().as_str()));
    assert!(matches!(
        records[0].priority,
        Priority::Low | Priority::Medium | Priority::High
    ));
}

#[test]
fn dataset_survives_csv_and_json_files() -> Result<()> {
    let dir = tempdir()?;
    let samples = FleetSimulator::new(21).simulate_timeseries(&FLEET[..2], 1);
    let dataset = TelemetryDataset::from_samples(&samples);

    let csv_path = dir.path().join("telemetry.csv");
    dataset.write_csv(fs::File::create(&csv_path)?)?;
    let from_csv = TelemetryDataset::from_path(&csv_path)?;
    assert_eq!(from_csv.columns(), dataset.columns());
    assert_eq!(from_csv.len(), dataset.len());
    let ambient_delta =
        (from_csv.mean(Column::Ambient).unwrap() - dataset.mean(Column::Ambient).unwrap()).abs();
    assert!(ambient_delta < 1e-9);

    let json_path = dir.path().join("telemetry.json");
    dataset.to_path(&json_path)?;
    let from_json = TelemetryDataset::from_path(&json_path)?;
    assert_eq!(from_json.for_chiller("CH-2").len(), 96);

    let unsupported = dir.path().join("telemetry.parquet");
    fs::write(&unsupported, b"")?;
    assert!(TelemetryDataset::from_path(&unsupported).is_err());
    assert!(dataset.to_path(&unsupported).is_err());
    Ok(())
}
