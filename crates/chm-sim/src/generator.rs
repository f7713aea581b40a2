//! ---
//! chm_section: "11-simulation"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Seedable generator for chiller telemetry and fleet summaries."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use chm_common::config::SimulationConfig;
use chrono::{DateTime, Duration, Utc};
use rand::prelude::*;
use rand_distr::Uniform;
use tracing::debug;

use crate::frames::{AnomalySummary, MaintenanceRecord, Priority, TelemetrySample};

/// Number of 15-minute steps in a day.
pub const SAMPLES_PER_DAY: u32 = 96;
pub const SAMPLE_INTERVAL_MINUTES: i64 = 15;

/// Baseline chiller power (kW) for the given operating point.
pub fn baseline_power(ambient: f64, it_load: f64, chw_in: f64) -> f64 {
    260.0 + (ambient - 30.0) * 10.0 + (it_load - 40.0) * 3.0 + (chw_in - 6.0) * 8.0
}

/// Relative deviation of actual from predicted power.
///
/// The denominator is clamped to 1 kW so a near-zero or negative prediction
/// never divides by zero.
pub fn anomaly_score(power_actual: f64, power_predicted: f64) -> f64 {
    (power_actual - power_predicted) / power_predicted.max(1.0)
}

/// Generates i.i.d. telemetry samples and per-chiller summaries from one RNG.
#[derive(Debug)]
pub struct FleetSimulator {
    rng: StdRng,
    ambient: Uniform<f64>,
    it_load: Uniform<f64>,
    chw_in: Uniform<f64>,
    predicted_noise: Uniform<f64>,
    actual_noise: Uniform<f64>,
    due_days: Uniform<u32>,
    anomaly_count: Uniform<u32>,
}

impl FleetSimulator {
    pub fn new(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Seeded when the configuration pins a seed, entropy-seeded otherwise.
    pub fn from_config(config: &SimulationConfig) -> Self {
        match config.random_seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            ambient: Uniform::new(28.0, 45.0),
            it_load: Uniform::new(40.0, 95.0),
            chw_in: Uniform::new(5.0, 14.0),
            predicted_noise: Uniform::new(0.92, 1.08),
            actual_noise: Uniform::new(0.85, 1.25),
            due_days: Uniform::new_inclusive(5, 180),
            anomaly_count: Uniform::new_inclusive(5, 45),
        }
    }

    /// Simulate `days` of 15-minute telemetry per chiller ending now.
    pub fn simulate_timeseries<S: AsRef<str>>(
        &mut self,
        chillers: &[S],
        days: u32,
    ) -> Vec<TelemetrySample> {
        self.simulate_timeseries_at(chillers, days, Utc::now())
    }

    /// Simulate telemetry for a window starting `days` before `now`.
    ///
    /// Samples are grouped per chiller in input order; within a chiller the
    /// timestamps advance by exactly 15 minutes.
    pub fn simulate_timeseries_at<S: AsRef<str>>(
        &mut self,
        chillers: &[S],
        days: u32,
        now: DateTime<Utc>,
    ) -> Vec<TelemetrySample> {
        let steps = days * SAMPLES_PER_DAY;
        let step = Duration::minutes(SAMPLE_INTERVAL_MINUTES);
        let mut samples = Vec::with_capacity(chillers.len() * steps as usize);
        for chiller in chillers {
            let mut time = now - Duration::days(i64::from(days));
            for _ in 0..steps {
                samples.push(self.sample(chiller.as_ref(), time));
                time += step;
            }
        }
        debug!(
            chillers = chillers.len(),
            days,
            samples = samples.len(),
            "telemetry simulated"
        );
        samples
    }

    /// Draw a single reading.
    pub fn sample(&mut self, chiller: &str, time: DateTime<Utc>) -> TelemetrySample {
        let ambient = self.ambient.sample(&mut self.rng);
        let it_load = self.it_load.sample(&mut self.rng);
        let chw_in = self.chw_in.sample(&mut self.rng);

        let base = baseline_power(ambient, it_load, chw_in);
        let power_predicted = base * self.predicted_noise.sample(&mut self.rng);
        let power_actual = base * self.actual_noise.sample(&mut self.rng);

        TelemetrySample {
            time,
            chiller: chiller.to_owned(),
            ambient,
            it_load,
            chw_in,
            power_predicted,
            power_actual,
            anomaly_score: anomaly_score(power_actual, power_predicted),
        }
    }

    /// One maintenance record per chiller, unrelated to telemetry.
    pub fn simulate_maintenance<S: AsRef<str>>(&mut self, chillers: &[S]) -> Vec<MaintenanceRecord> {
        chillers
            .iter()
            .map(|chiller| {
                let due_days = self.due_days.sample(&mut self.rng);
                let priority = Priority::ALL[self.rng.gen_range(0..Priority::ALL.len())];
                MaintenanceRecord {
                    chiller: chiller.as_ref().to_owned(),
                    due_days,
                    priority,
                }
            })
            .collect()
    }

    /// One anomaly count per chiller, unrelated to telemetry.
    pub fn simulate_anomaly_summary<S: AsRef<str>>(&mut self, chillers: &[S]) -> Vec<AnomalySummary> {
        chillers
            .iter()
            .map(|chiller| AnomalySummary {
                chiller: chiller.as_ref().to_owned(),
                count: self.anomaly_count.sample(&mut self.rng),
            })
            .collect()
    }
}
