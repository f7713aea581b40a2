//! ---
//! chm_section: "21-explanations"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Deterministic keyword-driven explanation built from local data."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
//! The offline explainer never touches the network. Its output is a pure
//! function of the query text and the dataset, so the same inputs always
//! produce byte-identical reports.
use chm_sim::dataset::{Column, TelemetryDataset};

const BULLET: &str = "• ";

/// Topic triggers in emission order: any matching substring emits the sentence once.
const TOPIC_RULES: [(&[&str], &str); 6] = [
    (
        &["ambient"],
        "Higher ambient temperature generally forces chillers to work harder, \
         increasing compressor power and shifting the power curve upward.",
    ),
    (
        &["it load"],
        "An increase in IT load raises the heat rejection requirement, which in turn \
         drives higher chilled-water demand and chiller power.",
    ),
    (
        &["chilled water inlet", "chw"],
        "Higher chilled water inlet temperature often indicates reduced heat transfer \
         efficiency across coils, which can lead to higher power for the same load.",
    ),
    (
        &["anomaly"],
        "High anomaly scores occur when the difference between predicted and actual power \
         or other variables exceeds the learned normal band.",
    ),
    (
        &["maintenance", "priority"],
        "Maintenance priority is usually driven by a combination of anomaly frequency, \
         magnitude of deviation, age/runtime of equipment, and business criticality.",
    ),
    (
        &["kpi", "threshold", "alert"],
        "Health KPIs and thresholds should be tuned so that they catch early degradation \
         without generating excessive nuisance alarms.",
    ),
];

/// Fixed operational checklist appended to every report.
pub const RECOMMENDED_ACTIONS: [&str; 5] = [
    "Verify setpoints for chilled water supply and condenser water loops.",
    "Check strainers, filters, and heat-exchanger fouling if power is trending high.",
    "Validate sensors (temperature, flow, power meters) for drift or calibration issues.",
    "If anomaly counts are consistently high, review KPI thresholds and alarm logic.",
    "For units with frequent deviations, plan targeted maintenance or inspection.",
];

/// Message returned when the dataset has no rows for the chiller.
pub fn no_data_message(chiller: &str) -> String {
    format!(
        "For chiller {chiller}, no data is available in the current simulation window. \
         Please verify the configuration."
    )
}

/// Topic sentences triggered by `query`, case-insensitively, in table order.
pub fn topic_statements(query: &str) -> Vec<&'static str> {
    let query = query.to_lowercase();
    TOPIC_RULES
        .iter()
        .filter(|(triggers, _)| triggers.iter().any(|trigger| query.contains(trigger)))
        .map(|(_, statement)| *statement)
        .collect()
}

/// Aggregates the offline report draws on. Each is `None` when its column is absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChillerStatistics {
    pub ambient_mean: Option<f64>,
    pub it_load_mean: Option<f64>,
    pub chw_in_mean: Option<f64>,
    pub anomaly_mean: Option<f64>,
    pub power_delta_mean: Option<f64>,
}

impl ChillerStatistics {
    pub fn from_dataset(selected: &TelemetryDataset) -> Self {
        Self {
            ambient_mean: selected.mean(Column::Ambient),
            it_load_mean: selected.mean(Column::ItLoad),
            chw_in_mean: selected.mean(Column::ChwIn),
            anomaly_mean: selected.mean(Column::AnomalyScore),
            power_delta_mean: selected.mean_power_delta(),
        }
    }

    fn bullets(&self, chiller: &str) -> Vec<String> {
        let mut bullets = Vec::new();
        if let Some(ambient) = self.ambient_mean {
            bullets.push(format!(
                "In the current simulation, mean ambient temperature for {chiller} is \
                 around {ambient:.1} °C."
            ));
        }
        if let Some(it_load) = self.it_load_mean {
            bullets.push(format!(
                "The average IT load is ~{it_load:.1}% of design, which influences both \
                 cooling demand and power consumption."
            ));
        }
        if let Some(chw_in) = self.chw_in_mean {
            bullets.push(format!(
                "The average chilled water inlet temperature is ~{chw_in:.1} °C in this period."
            ));
        }
        if let Some(anomaly) = self.anomaly_mean {
            bullets.push(format!(
                "The mean anomaly score for {chiller} is {anomaly:.3} \
                 (positive = above expected, negative = below expected)."
            ));
        }
        if let Some(delta) = self.power_delta_mean {
            let direction = if delta > 0.0 { "above" } else { "below" };
            bullets.push(format!(
                "On average, actual power is about {:.1} kW {direction} the \
                 predicted/design power profile.",
                delta.abs()
            ));
        }
        bullets
    }
}

/// Build the rule-based report for `chiller` from `dataset`.
pub fn explain_offline(query: &str, dataset: &TelemetryDataset, chiller: &str) -> String {
    let selected = dataset.for_chiller(chiller);
    if selected.is_empty() {
        return no_data_message(chiller);
    }

    let stats = ChillerStatistics::from_dataset(&selected);
    let findings = topic_statements(query)
        .into_iter()
        .map(str::to_owned)
        .chain(stats.bullets(chiller));

    let mut lines = vec![
        format!("**Offline explanation for chiller {chiller}** *(no cloud model used)*\n"),
        format!("**User question:** {query}\n"),
        "### What the data suggests:".to_owned(),
    ];
    lines.extend(findings.map(|finding| format!("{BULLET}{finding}")));
    lines.push(String::new());
    lines.push("### Recommended actions for operations:".to_owned());
    lines.extend(
        RECOMMENDED_ACTIONS
            .iter()
            .map(|action| format!("{BULLET}{action}")),
    );
    lines.join("\n")
}
