//! ---
//! chm_section: "31-cli"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Plain-text and JSON rendering of CLI results."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use std::fmt::Write as _;

use anyhow::Result;
use chm_sim::{AnomalySummary, HealthKpis, HistogramBin, MaintenanceRecord};
use clap::ValueEnum;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::views::DashboardView;

const BAR_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Left-aligned first column, right-aligned remainder, two-space gutters.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(idx, (cell, width))| {
                if idx == 0 {
                    format!("{cell:<width$}")
                } else {
                    format!("{cell:>width$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };
    let mut out = vec![line(headers.to_vec())];
    out.extend(
        rows.iter()
            .map(|row| line(row.iter().map(String::as_str).collect())),
    );
    out.join("\n")
}

pub fn maintenance(records: &[MaintenanceRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| vec![r.chiller.clone(), r.due_days.to_string(), r.priority.to_string()])
        .collect();
    table(&["chiller", "due_days", "priority"], &rows)
}

pub fn anomalies(summary: &[AnomalySummary]) -> String {
    let rows: Vec<Vec<String>> = summary
        .iter()
        .map(|s| vec![s.chiller.clone(), s.count.to_string()])
        .collect();
    table(&["chiller", "count"], &rows)
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "n/a".to_owned(), |v| format!("{v:.precision$}"))
}

pub fn kpis(kpis: &[HealthKpis]) -> String {
    let rows: Vec<Vec<String>> = kpis
        .iter()
        .map(|k| {
            vec![
                k.chiller.clone(),
                optional(k.efficiency_index, 2),
                optional(k.mean_abs_anomaly, 3),
                format!("{:.1} h", k.hours_analysed),
            ]
        })
        .collect();
    table(
        &[
            "chiller",
            "avg efficiency index",
            "avg anomaly score",
            "hours analysed",
        ],
        &rows,
    )
}

pub fn histogram(bins: &[HistogramBin]) -> String {
    let peak = bins.iter().map(|bin| bin.count).max().unwrap_or(0).max(1);
    let mut out = String::new();
    for bin in bins {
        let bar = "#".repeat(bin.count * BAR_WIDTH / peak);
        let _ = writeln!(
            out,
            "[{:>8.4}, {:>8.4}]  {:>6}  {bar}",
            bin.lower, bin.upper, bin.count
        );
    }
    out.trim_end().to_owned()
}

#[derive(Serialize)]
struct ViewListing {
    view: &'static str,
    title: &'static str,
    fleet_level: bool,
    presets: &'static [&'static str],
}

pub fn views(format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let listing: Vec<ViewListing> = DashboardView::iter()
                .map(|view| ViewListing {
                    view: view.slug(),
                    title: view.title(),
                    fleet_level: view.is_fleet_level(),
                    presets: view.presets(),
                })
                .collect();
            json(&listing)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for view in DashboardView::iter() {
                let scope = if view.is_fleet_level() {
                    "fleet, anchored on the first chiller"
                } else {
                    "per chiller"
                };
                let _ = writeln!(out, "{} ({}) [{scope}]", view.title(), view.slug());
                for (idx, preset) in view.presets().iter().enumerate() {
                    let _ = writeln!(out, "  {idx}: {preset}");
                }
            }
            Ok(out.trim_end().to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chm_sim::Priority;

    #[test]
    fn maintenance_table_is_aligned() {
        let records = vec![
            MaintenanceRecord {
                chiller: "CH-1".into(),
                due_days: 5,
                priority: Priority::High,
            },
            MaintenanceRecord {
                chiller: "CH-10".into(),
                due_days: 180,
                priority: Priority::Low,
            },
        ];
        let rendered = maintenance(&records);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "chiller  due_days  priority");
        assert_eq!(lines[1], "CH-1            5      High");
        assert_eq!(lines[2], "CH-10         180       Low");
    }

    #[test]
    fn kpis_show_missing_values() {
        let rendered = kpis(&[HealthKpis {
            chiller: "CH-1".into(),
            efficiency_index: Some(0.98765),
            mean_abs_anomaly: None,
            hours_analysed: 168.0,
        }]);
        let row = rendered.lines().nth(1).unwrap();
        assert!(row.contains("0.99"));
        assert!(row.contains("n/a"));
        assert!(row.ends_with("168.0 h"));
    }

    #[test]
    fn histogram_bars_scale_to_peak() {
        let bins = vec![
            HistogramBin {
                lower: -0.1,
                upper: 0.0,
                count: 10,
            },
            HistogramBin {
                lower: 0.0,
                upper: 0.1,
                count: 5,
            },
        ];
        let rendered = histogram(&bins);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].ends_with(&"#".repeat(BAR_WIDTH)));
        assert!(lines[1].ends_with(&format!(" {}", "#".repeat(BAR_WIDTH / 2))));
    }

    #[test]
    fn view_listing_in_both_formats() {
        let text = views(OutputFormat::Text).unwrap();
        assert!(text.contains("Anomaly Detection (anomaly-detection) [fleet, anchored on the first chiller]"));
        assert!(text.contains("  0: Higher ambient temperature"));

        let parsed: serde_json::Value = serde_json::from_str(&views(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 4);
        assert_eq!(parsed[3]["view"], "design-power");
    }
}
