//! Consent platform backend contract and its HTTP client.
//!
//! `PortalApi` is the seam every resource and flow talks through; the
//! production implementation is `HttpPortalApi`, tests substitute the
//! in-process doubles from `mock`.

pub mod client;
pub mod error;
#[cfg(test)]
pub mod mock;
pub mod normalize;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{
    Consent, ConsentStatus, ConsentUpdate, MedicalRecord, NewConsent, Patient, PatientPage,
    Stats, Transaction,
};

pub use client::HttpPortalApi;
pub use error::{error_message, ApiError};

/// Shared handle used by resources and flows.
pub type SharedApi = Arc<dyn PortalApi>;

/// Operations exposed by the backend. List results are already normalized.
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// One page of patients, 1-based. An empty `search` matches everyone.
    async fn get_patients(&self, page: u32, limit: u32, search: &str)
        -> Result<PatientPage, ApiError>;

    async fn get_patient(&self, id: &str) -> Result<Patient, ApiError>;

    async fn get_patient_records(&self, id: &str) -> Result<Vec<MedicalRecord>, ApiError>;

    /// Consents, optionally narrowed to one patient and/or one status.
    async fn get_consents(
        &self,
        patient_id: Option<&str>,
        status: Option<ConsentStatus>,
    ) -> Result<Vec<Consent>, ApiError>;

    async fn create_consent(&self, consent: &NewConsent) -> Result<Consent, ApiError>;

    async fn update_consent(&self, id: &str, update: &ConsentUpdate) -> Result<Consent, ApiError>;

    /// Most recent transactions, optionally only those touching `wallet`.
    async fn get_transactions(
        &self,
        wallet: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Transaction>, ApiError>;

    async fn get_stats(&self) -> Result<Stats, ApiError>;
}
