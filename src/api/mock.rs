//! In-process `PortalApi` doubles for tests.
//!
//! - `MockPortalApi`: a small in-memory backend with call recording and
//!   per-operation failure injection.
//! - `GatedPortalApi`: every call parks until the test answers it, which
//!   lets a test decide the order in which overlapping requests complete.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use super::normalize::{unwrap_list, unwrap_patient_page};
use super::{ApiError, PortalApi};
use crate::models::{
    Consent, ConsentStatus, ConsentUpdate, MedicalRecord, NewConsent, Patient, PatientPage,
    Stats, Transaction,
};

// ═══════════════════════════════════════════════════════════
// MockPortalApi
// ═══════════════════════════════════════════════════════════

#[derive(Default)]
struct MockData {
    patients: Vec<Patient>,
    records: HashMap<String, Vec<MedicalRecord>>,
    consents: Vec<Consent>,
    transactions: Vec<Transaction>,
    stats: Stats,
    failing: HashSet<&'static str>,
    calls: Vec<String>,
    next_id: u32,
}

/// In-memory backend. Consents are kept in creation order.
#[derive(Default)]
pub struct MockPortalApi {
    data: Mutex<MockData>,
}

impl MockPortalApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patients(self, patients: Vec<Patient>) -> Self {
        self.data.lock().unwrap().patients = patients;
        self
    }

    pub fn with_records(self, patient_id: &str, records: Vec<MedicalRecord>) -> Self {
        self.data
            .lock()
            .unwrap()
            .records
            .insert(patient_id.to_string(), records);
        self
    }

    pub fn with_consents(self, consents: Vec<Consent>) -> Self {
        self.data.lock().unwrap().consents = consents;
        self
    }

    pub fn with_transactions(self, transactions: Vec<Transaction>) -> Self {
        self.data.lock().unwrap().transactions = transactions;
        self
    }

    pub fn with_stats(self, stats: Stats) -> Self {
        self.data.lock().unwrap().stats = stats;
        self
    }

    /// Make every call to `op` (e.g. `"get_consents"`) fail with a 500.
    pub fn fail(&self, op: &'static str) {
        self.data.lock().unwrap().failing.insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.data.lock().unwrap().failing.remove(op);
    }

    /// Calls seen so far, formatted as `op(args)`.
    pub fn calls(&self) -> Vec<String> {
        self.data.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split('(').next() == Some(op))
            .count()
    }

    pub fn consents(&self) -> Vec<Consent> {
        self.data.lock().unwrap().consents.clone()
    }

    fn record(&self, op: &'static str, args: String) -> Result<(), ApiError> {
        let mut data = self.data.lock().unwrap();
        data.calls.push(format!("{op}({args})"));
        if data.failing.contains(op) {
            return Err(ApiError::Status {
                status: 500,
                message: format!("{op} unavailable"),
            });
        }
        Ok(())
    }
}

pub fn patient(id: &str, name: &str) -> Patient {
    Patient {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.org", id),
        gender: "female".to_string(),
        phone: "555-0100".to_string(),
        ..Patient::default()
    }
}

pub fn consent(id: &str, status: ConsentStatus, created_at: &str) -> Consent {
    Consent {
        id: id.to_string(),
        patient_id: "patient-001".to_string(),
        purpose: "Research Study Participation".to_string(),
        status,
        wallet_address: "0xABC0000000000000000000000000000000000001".to_string(),
        signature: "0xsig".to_string(),
        created_at: created_at.to_string(),
        blockchain_tx_hash: None,
    }
}

#[async_trait]
impl PortalApi for MockPortalApi {
    async fn get_patients(
        &self,
        page: u32,
        limit: u32,
        search: &str,
    ) -> Result<PatientPage, ApiError> {
        self.record("get_patients", format!("{page},{limit},{search}"))?;
        let data = self.data.lock().unwrap();
        let needle = search.to_lowercase();
        let matching: Vec<Patient> = data
            .patients
            .iter()
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let start = (page.saturating_sub(1) * limit) as usize;
        Ok(PatientPage {
            total: matching.len() as u64,
            patients: matching.into_iter().skip(start).take(limit as usize).collect(),
        })
    }

    async fn get_patient(&self, id: &str) -> Result<Patient, ApiError> {
        self.record("get_patient", id.to_string())?;
        self.data
            .lock()
            .unwrap()
            .patients
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "Patient not found".to_string(),
            })
    }

    async fn get_patient_records(&self, id: &str) -> Result<Vec<MedicalRecord>, ApiError> {
        self.record("get_patient_records", id.to_string())?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .records
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_consents(
        &self,
        patient_id: Option<&str>,
        status: Option<ConsentStatus>,
    ) -> Result<Vec<Consent>, ApiError> {
        self.record(
            "get_consents",
            format!("{},{}", patient_id.unwrap_or("-"), status.map_or("-", |s| s.as_str())),
        )?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .consents
            .iter()
            .filter(|c| patient_id.map_or(true, |id| c.patient_id == id))
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect())
    }

    async fn create_consent(&self, consent: &NewConsent) -> Result<Consent, ApiError> {
        self.record(
            "create_consent",
            format!(
                "{},{},{},{}",
                consent.patient_id, consent.purpose, consent.wallet_address, consent.signature
            ),
        )?;
        let mut data = self.data.lock().unwrap();
        data.next_id += 1;
        let created = Consent {
            id: format!("consent-new-{}", data.next_id),
            patient_id: consent.patient_id.clone(),
            purpose: consent.purpose.as_str().to_string(),
            status: ConsentStatus::Pending,
            wallet_address: consent.wallet_address.clone(),
            signature: consent.signature.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            blockchain_tx_hash: None,
        };
        data.consents.push(created.clone());
        Ok(created)
    }

    async fn update_consent(&self, id: &str, update: &ConsentUpdate) -> Result<Consent, ApiError> {
        self.record(
            "update_consent",
            format!("{id},{},{}", update.status, update.blockchain_tx_hash),
        )?;
        let mut data = self.data.lock().unwrap();
        let consent = data
            .consents
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "Consent not found".to_string(),
            })?;
        consent.status = update.status;
        consent.blockchain_tx_hash = Some(update.blockchain_tx_hash.clone());
        Ok(consent.clone())
    }

    async fn get_transactions(
        &self,
        wallet: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Transaction>, ApiError> {
        self.record("get_transactions", format!("{},{limit}", wallet.unwrap_or("-")))?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .transactions
            .iter()
            .filter(|t| wallet.map_or(true, |w| t.from == w || t.to == w))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_stats(&self) -> Result<Stats, ApiError> {
        self.record("get_stats", String::new())?;
        Ok(self.data.lock().unwrap().stats)
    }
}

// ═══════════════════════════════════════════════════════════
// GatedPortalApi
// ═══════════════════════════════════════════════════════════

/// One parked call. Answer it with `respond`; the payload is decoded with
/// the same normalization the HTTP client applies.
pub struct GatedCall {
    pub op: &'static str,
    pub args: String,
    reply: oneshot::Sender<Result<Value, ApiError>>,
}

impl GatedCall {
    pub fn respond(self, payload: Value) {
        let _ = self.reply.send(Ok(payload));
    }

    pub fn fail(self, err: ApiError) {
        let _ = self.reply.send(Err(err));
    }
}

pub struct GatedPortalApi {
    calls: mpsc::UnboundedSender<GatedCall>,
}

impl GatedPortalApi {
    /// The API plus the receiving end the test pulls parked calls from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<GatedCall>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { calls: tx }, rx)
    }

    async fn park(&self, op: &'static str, args: String) -> Result<Value, ApiError> {
        let (reply, answer) = oneshot::channel();
        self.calls
            .send(GatedCall { op, args, reply })
            .map_err(|_| ApiError::Http("gate closed".into()))?;
        answer
            .await
            .map_err(|_| ApiError::Http("call dropped".into()))?
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl PortalApi for GatedPortalApi {
    async fn get_patients(
        &self,
        page: u32,
        limit: u32,
        search: &str,
    ) -> Result<PatientPage, ApiError> {
        Ok(unwrap_patient_page(self.park("get_patients", format!("{page},{limit},{search}")).await?))
    }

    async fn get_patient(&self, id: &str) -> Result<Patient, ApiError> {
        decode(self.park("get_patient", id.to_string()).await?)
    }

    async fn get_patient_records(&self, id: &str) -> Result<Vec<MedicalRecord>, ApiError> {
        Ok(unwrap_list(self.park("get_patient_records", id.to_string()).await?, "records"))
    }

    async fn get_consents(
        &self,
        patient_id: Option<&str>,
        status: Option<ConsentStatus>,
    ) -> Result<Vec<Consent>, ApiError> {
        let args = format!("{},{}", patient_id.unwrap_or("-"), status.map_or("-", |s| s.as_str()));
        Ok(unwrap_list(self.park("get_consents", args).await?, "consents"))
    }

    async fn create_consent(&self, consent: &NewConsent) -> Result<Consent, ApiError> {
        decode(self.park("create_consent", consent.patient_id.clone()).await?)
    }

    async fn update_consent(&self, id: &str, _update: &ConsentUpdate) -> Result<Consent, ApiError> {
        decode(self.park("update_consent", id.to_string()).await?)
    }

    async fn get_transactions(
        &self,
        wallet: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Transaction>, ApiError> {
        let args = format!("{},{limit}", wallet.unwrap_or("-"));
        Ok(unwrap_list(self.park("get_transactions", args).await?, "transactions"))
    }

    async fn get_stats(&self) -> Result<Stats, ApiError> {
        decode(self.park("get_stats", String::new()).await?)
    }
}
