//! ---
//! chm_section: "21-explanations"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Prompt assembly for the remote model call."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use chm_sim::dataset::{Column, TelemetryDataset};

/// Rows of recent history embedded in the prompt (six hours at 15-minute steps).
pub const RECENT_ROWS: usize = 24;

/// Columns the model is told about, in the order they are defined.
pub const PROMPT_COLUMNS: [Column; 7] = [
    Column::Time,
    Column::Ambient,
    Column::ItLoad,
    Column::ChwIn,
    Column::PowerPredicted,
    Column::PowerActual,
    Column::AnomalyScore,
];

/// The most recent telemetry for `chiller`, projected to the prompt columns.
///
/// Falls back to every column when none of the prompt columns are present.
pub fn recent_view(dataset: &TelemetryDataset, chiller: &str) -> TelemetryDataset {
    let recent = dataset
        .for_chiller(chiller)
        .sorted_by_time()
        .tail(RECENT_ROWS);
    if recent
        .columns()
        .iter()
        .any(|column| PROMPT_COLUMNS.contains(column))
    {
        recent.project(&PROMPT_COLUMNS)
    } else {
        recent
    }
}

/// Assemble the instruction prompt for `chiller`.
pub fn build_prompt(query: &str, dataset: &TelemetryDataset, chiller: &str) -> String {
    let table = recent_view(dataset, chiller).to_text_table();
    format!(
        r#"
You are an expert Data Center & BMS AI assistant focusing on chiller analytics.

User question:
"""{query}"""

Selected chiller: {chiller}

Here is the latest telemetry for this chiller (most recent rows at the bottom):

{table}

Columns (if present) mean:
- time: timestamp of the sample
- ambient: ambient (outdoor) air temperature in °C
- it_load: IT load (% of design)
- chw_in: chilled water inlet temperature in °C
- power_predicted: model-predicted power draw (design / expected)
- power_actual: actual measured power draw
- anomaly_score: positive = unusual/high deviation, negative = unusually low

TASK:
1. Directly answer the user's question in context of this data.
2. Explain WHY the graphs might show deviations or changes.
3. Explicitly name which parameter(s) are driving the deviation.
4. Explain impact for the operations team.
5. Suggest 3–6 concrete operational actions.

Be clear and concise. Use short bullet points.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chm_sim::dataset::TelemetryRow;
    use chm_sim::generator::FleetSimulator;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn keeps_only_recognised_columns() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut dataset = TelemetryDataset::new([Column::Time, Column::Chiller, Column::Ambient]);
        for step in 0..3 {
            dataset.push(TelemetryRow {
                time: Some(start + Duration::minutes(15 * step)),
                chiller: Some("CH-1".into()),
                ambient: Some(30.0 + step as f64),
                ..Default::default()
            });
        }
        let view = recent_view(&dataset, "CH-1");
        assert_eq!(view.columns(), &[Column::Time, Column::Ambient]);

        let prompt = build_prompt("Higher ambient temperature", &dataset, "CH-1");
        let header = prompt
            .lines()
            .find(|line| line.contains("ambient") && line.trim_start().starts_with("time"))
            .unwrap();
        assert_eq!(header.split_whitespace().collect::<Vec<_>>(), ["time", "ambient"]);
        assert!(!header.contains("chiller"));
    }

    #[test]
    fn takes_last_24_rows_in_time_order() {
        let now = Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap();
        let mut samples = FleetSimulator::new(8).simulate_timeseries_at(&["CH-1", "CH-2"], 1, now);
        samples.reverse();
        let dataset = TelemetryDataset::from_samples(&samples);

        let view = recent_view(&dataset, "CH-1");
        assert_eq!(view.len(), RECENT_ROWS);
        let times: Vec<_> = view.rows().iter().map(|row| row.time.unwrap()).collect();
        assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(*times.last().unwrap(), now - Duration::minutes(15));
        assert_eq!(view.columns(), &PROMPT_COLUMNS);
    }

    #[test]
    fn embeds_query_chiller_and_instructions() {
        let now = Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap();
        let samples = FleetSimulator::new(9).simulate_timeseries_at(&["CH-7"], 1, now);
        let dataset = TelemetryDataset::from_samples(&samples);
        let prompt = build_prompt("Why is power high?", &dataset, "CH-7");
        assert!(prompt.contains("\"\"\"Why is power high?\"\"\""));
        assert!(prompt.contains("Selected chiller: CH-7"));
        assert!(prompt.contains("5. Suggest 3–6 concrete operational actions."));
        assert!(prompt.contains("power_predicted"));
        assert_eq!(prompt, build_prompt("Why is power high?", &dataset, "CH-7"));
    }

    #[test]
    fn unknown_chiller_yields_header_only_table() {
        let dataset = TelemetryDataset::new([Column::Chiller, Column::Ambient]);
        let view = recent_view(&dataset, "CH-1");
        assert!(view.is_empty());
        assert_eq!(view.to_text_table(), "ambient");
    }

    #[test]
    fn falls_back_to_all_columns_without_recognised_ones() {
        let mut dataset = TelemetryDataset::new([Column::Chiller]);
        dataset.push(TelemetryRow {
            chiller: Some("CH-1".into()),
            ..Default::default()
        });
        let view = recent_view(&dataset, "CH-1");
        assert_eq!(view.columns(), &[Column::Chiller]);
    }
}
