//! ---
//! chm_section: "31-cli"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Dashboard views and their preset analysis questions."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use clap::ValueEnum;
use strum::{EnumIter, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum DashboardView {
    PowerConsumption,
    AnomalyDetection,
    PredictiveMaintenance,
    DesignPower,
}

impl DashboardView {
    pub fn slug(self) -> &'static str {
        self.into()
    }

    pub fn title(self) -> &'static str {
        match self {
            DashboardView::PowerConsumption => "Power Consumption",
            DashboardView::AnomalyDetection => "Anomaly Detection",
            DashboardView::PredictiveMaintenance => "Predictive Maintenance",
            DashboardView::DesignPower => "Design Power",
        }
    }

    /// Analysis questions offered by the view, in display order.
    pub fn presets(self) -> &'static [&'static str] {
        match self {
            DashboardView::PowerConsumption => &[
                "Higher ambient temperature",
                "Increase in IT load",
                "Increase in chilled water inlet temperature",
            ],
            DashboardView::AnomalyDetection => &[
                "What exactly triggers a high anomaly score",
                "How the operations team should interpret each category",
                "What actions need to be taken for different anomaly levels",
            ],
            DashboardView::PredictiveMaintenance => &[
                "Which parameters the model uses (runtime, performance degradation, fleet score, etc.)",
                "How operations should decide on maintenance priority",
            ],
            DashboardView::DesignPower => &[
                "Health KPIs and thresholds",
                "What conditions require immediate escalation by the operations team",
                "What triggers an internal alert from the model",
            ],
        }
    }

    /// Fleet-level views explain against the first configured chiller
    /// instead of a selected one.
    pub fn is_fleet_level(self) -> bool {
        matches!(
            self,
            DashboardView::AnomalyDetection | DashboardView::PredictiveMaintenance
        )
    }

    pub fn preset(self, index: usize) -> Option<&'static str> {
        self.presets().get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_view_offers_presets() {
        for view in DashboardView::iter() {
            assert!(!view.presets().is_empty());
            assert_eq!(view.preset(0), view.presets().first().copied());
        }
        assert_eq!(DashboardView::PredictiveMaintenance.presets().len(), 2);
        assert_eq!(DashboardView::DesignPower.preset(3), None);
    }

    #[test]
    fn fleet_views_are_anomaly_and_maintenance() {
        let fleet: Vec<_> = DashboardView::iter()
            .filter(|view| view.is_fleet_level())
            .collect();
        assert_eq!(
            fleet,
            vec![
                DashboardView::AnomalyDetection,
                DashboardView::PredictiveMaintenance
            ]
        );
    }

    #[test]
    fn slugs_match_cli_values() {
        for view in DashboardView::iter() {
            let value = view.to_possible_value().unwrap();
            assert_eq!(value.get_name(), view.slug());
        }
    }
}
