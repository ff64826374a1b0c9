use std::fmt;

use serde::Serialize;

use super::Screen;
use crate::models::Stats;
use crate::resources::StatsResource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatItem {
    pub label: &'static str,
    pub value: u64,
}

/// `items` is empty when no statistics have been loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsView {
    pub items: Vec<StatItem>,
}

impl StatsView {
    pub fn build(resource: &StatsResource) -> Screen<Self> {
        Screen::from_snapshot(&resource.snapshot(), "statistics", |stats| {
            Self::from_stats(stats.as_ref())
        })
    }

    fn from_stats(stats: Option<&Stats>) -> Self {
        let items = stats
            .map(|s| {
                vec![
                    StatItem { label: "Total Patients", value: s.total_patients },
                    StatItem { label: "Total Records", value: s.total_records },
                    StatItem { label: "Total Consents", value: s.total_consents },
                    StatItem { label: "Active Consents", value: s.active_consents },
                    StatItem { label: "Pending Consents", value: s.pending_consents },
                    StatItem { label: "Total Transactions", value: s.total_transactions },
                ]
            })
            .unwrap_or_default();
        Self { items }
    }
}

impl fmt::Display for StatsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return writeln!(f, "No data available");
        }
        writeln!(f, "Platform Statistics")?;
        for item in &self.items {
            writeln!(f, "  {:<20}{}", item.label, item.value)?;
        }
        Ok(())
    }
}
