use std::cmp::Reverse;

use serde::Serialize;

use super::cell::{FetchTicket, ResourceCell, ResourceSnapshot};
use crate::api::{ApiError, SharedApi};
use crate::format::parse_timestamp;
use crate::models::{Consent, ConsentStatus, ConsentUpdate, NewConsent, StatusFilter};

/// Trigger inputs for a consent list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsentQuery {
    pub patient_id: Option<String>,
    pub status: StatusFilter,
}

/// Newest `createdAt` first. Entries whose timestamp cannot be parsed go
/// last; ties keep their server order.
pub fn sort_newest_first(mut consents: Vec<Consent>) -> Vec<Consent> {
    consents.sort_by_cached_key(|c| {
        let created = parse_timestamp(&c.created_at);
        (created.is_none(), Reverse(created))
    });
    consents
}

/// Consent list with its write operations. A successful write is followed
/// by a refresh of the list; a failed one leaves the list as it was.
#[derive(Clone)]
pub struct ConsentsResource {
    api: SharedApi,
    cell: ResourceCell<ConsentQuery, Vec<Consent>>,
}

impl ConsentsResource {
    pub fn new(api: SharedApi, patient_id: Option<String>, status: StatusFilter) -> Self {
        let query = ConsentQuery {
            patient_id: patient_id.filter(|id| !id.is_empty()),
            status,
        };
        Self {
            api,
            cell: ResourceCell::new("consents", "Failed to load consents", query, Vec::new()),
        }
    }

    pub fn snapshot(&self) -> ResourceSnapshot<Vec<Consent>> {
        self.cell.snapshot()
    }

    pub fn query(&self) -> ConsentQuery {
        self.cell.inputs()
    }

    pub async fn load(&self) {
        let (ticket, query) = self.cell.begin();
        self.run(ticket, query).await;
    }

    pub async fn refresh(&self) {
        self.load().await;
    }

    pub async fn set_status_filter(&self, status: StatusFilter) -> bool {
        match self.cell.update(|q| q.status = status) {
            Some((ticket, query)) => {
                self.run(ticket, query).await;
                true
            }
            None => false,
        }
    }

    pub async fn create(&self, consent: &NewConsent) -> Result<Consent, ApiError> {
        let created = self
            .api
            .create_consent(consent)
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "Consent creation failed"))?;
        tracing::info!(consent_id = %created.id, "Consent created");
        self.refresh().await;
        Ok(created)
    }

    pub async fn update_status(
        &self,
        id: &str,
        update: &ConsentUpdate,
    ) -> Result<Consent, ApiError> {
        let updated = self
            .api
            .update_consent(id, update)
            .await
            .inspect_err(|err| tracing::warn!(consent_id = id, error = %err, "Consent update failed"))?;
        tracing::info!(consent_id = id, status = %update.status, "Consent updated");
        self.refresh().await;
        Ok(updated)
    }

    /// Mark a pending consent active, recording the anchoring transaction.
    pub async fn activate(&self, id: &str, tx_hash: &str) -> Result<Consent, ApiError> {
        let update = ConsentUpdate {
            status: ConsentStatus::Active,
            blockchain_tx_hash: tx_hash.to_string(),
        };
        self.update_status(id, &update).await
    }

    async fn run(&self, ticket: FetchTicket, query: ConsentQuery) {
        tracing::debug!(
            patient_id = query.patient_id.as_deref().unwrap_or("-"),
            status = query.status.label(),
            "Loading consents"
        );
        let result = self
            .api
            .get_consents(query.patient_id.as_deref(), query.status.as_query())
            .await
            .map(sort_newest_first);
        self.cell.settle(ticket, result);
    }
}
