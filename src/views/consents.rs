use std::fmt;

use serde::Serialize;

use super::{field_line, Screen};
use crate::format::{format_date, truncate_address, DateStyle};
use crate::models::{Consent, ConsentStatus, StatusFilter};
use crate::resources::ConsentsResource;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsentRow {
    pub id: String,
    pub patient_id: String,
    pub purpose: String,
    pub status: ConsentStatus,
    pub wallet: String,
    pub created: String,
    pub tx_hash: Option<String>,
    /// Only pending consents offer the activate action.
    pub can_activate: bool,
}

impl From<&Consent> for ConsentRow {
    fn from(c: &Consent) -> Self {
        Self {
            id: c.id.clone(),
            patient_id: c.patient_id.clone(),
            purpose: c.purpose.clone(),
            status: c.status,
            wallet: truncate_address(&c.wallet_address),
            created: format_date(&c.created_at, DateStyle::Long),
            tx_hash: c.blockchain_tx_hash.clone(),
            can_activate: c.is_pending(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsentListView {
    pub filter: StatusFilter,
    pub rows: Vec<ConsentRow>,
}

impl ConsentListView {
    /// Rows keep the resource's newest-first order.
    pub fn build(resource: &ConsentsResource) -> Screen<Self> {
        let filter = resource.query().status;
        Screen::from_snapshot(&resource.snapshot(), "consents", |consents| Self {
            filter,
            rows: consents.iter().map(ConsentRow::from).collect(),
        })
    }
}

impl fmt::Display for ConsentListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Consents [{}]", self.filter.label())?;
        if self.rows.is_empty() {
            return writeln!(f, "No consents found");
        }
        for row in &self.rows {
            writeln!(f, "- {} | {} | {}", row.id, row.purpose, row.status)?;
            field_line(f, "Patient", &row.patient_id)?;
            field_line(f, "Wallet", &row.wallet)?;
            field_line(f, "Created", &row.created)?;
            if let Some(hash) = &row.tx_hash {
                field_line(f, "Tx", hash)?;
            }
            if row.can_activate {
                writeln!(f, "  [Activate]")?;
            }
        }
        Ok(())
    }
}
