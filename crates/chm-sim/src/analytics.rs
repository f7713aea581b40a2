//! ---
//! chm_section: "11-simulation"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Health KPIs and anomaly score distribution."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::dataset::{Column, TelemetryDataset};

/// Hours represented by one 15-minute sample.
const HOURS_PER_SAMPLE: f64 = 0.25;

/// Design-power KPIs for one chiller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthKpis {
    pub chiller: String,
    /// `sum(predicted) / max(sum(actual), 1)`.
    pub efficiency_index: Option<f64>,
    pub mean_abs_anomaly: Option<f64>,
    pub hours_analysed: f64,
}

impl HealthKpis {
    pub fn for_chiller(dataset: &TelemetryDataset, chiller: &str) -> Self {
        let selected = dataset.for_chiller(chiller);
        let efficiency_index = if selected.has_column(Column::PowerPredicted)
            && selected.has_column(Column::PowerActual)
        {
            let predicted: f64 = selected.values(Column::PowerPredicted).iter().sum();
            let actual: f64 = selected.values(Column::PowerActual).iter().sum();
            Some(predicted / actual.max(1.0))
        } else {
            None
        };
        let abs_scores: Vec<f64> = selected
            .values(Column::AnomalyScore)
            .into_iter()
            .map(f64::abs)
            .collect();
        let mean_abs_anomaly = if abs_scores.is_empty() {
            None
        } else {
            Some(abs_scores.iter().mean())
        };
        Self {
            chiller: chiller.to_owned(),
            efficiency_index,
            mean_abs_anomaly,
            hours_analysed: selected.len() as f64 * HOURS_PER_SAMPLE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram of anomaly scores across every row of the dataset.
///
/// Returns `None` when there are no scores or `bins` is zero. The last bin is
/// closed on the right so the maximum is counted.
pub fn anomaly_histogram(dataset: &TelemetryDataset, bins: usize) -> Option<Vec<HistogramBin>> {
    let scores = dataset.values(Column::AnomalyScore);
    if scores.is_empty() || bins == 0 {
        return None;
    }
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return Some(vec![HistogramBin {
            lower: min,
            upper: max,
            count: scores.len(),
        }]);
    }

    let width = (max - min) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|idx| HistogramBin {
            lower: min + width * idx as f64,
            upper: if idx + 1 == bins {
                max
            } else {
                min + width * (idx + 1) as f64
            },
            count: 0,
        })
        .collect();
    for score in scores {
        let idx = (((score - min) / width) as usize).min(bins - 1);
        histogram[idx].count += 1;
    }
    Some(histogram)
}
