use serde::Serialize;

use super::cell::{FetchTicket, ResourceCell, ResourceSnapshot};
use crate::api::SharedApi;
use crate::models::{MedicalRecord, Patient};

/// A patient together with their medical records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientDetail {
    pub patient: Option<Patient>,
    pub records: Vec<MedicalRecord>,
}

/// Detail view for one patient. Inputs are the patient id; an empty id
/// means nothing is selected and no request is made.
#[derive(Clone)]
pub struct PatientDetailResource {
    api: SharedApi,
    cell: ResourceCell<String, PatientDetail>,
}

impl PatientDetailResource {
    pub fn new(api: SharedApi, patient_id: impl Into<String>) -> Self {
        Self {
            api,
            cell: ResourceCell::new(
                "patient_detail",
                "Failed to load patient details",
                patient_id.into(),
                PatientDetail::default(),
            ),
        }
    }

    pub fn snapshot(&self) -> ResourceSnapshot<PatientDetail> {
        self.cell.snapshot()
    }

    pub fn patient_id(&self) -> String {
        self.cell.inputs()
    }

    pub async fn load(&self) {
        if let Some((ticket, id)) = self.cell.begin_unless(String::is_empty) {
            self.run(ticket, id).await;
        }
    }

    /// Select another patient. Clearing the id cancels any in-flight fetch.
    pub async fn set_patient_id(&self, id: impl Into<String>) -> bool {
        let id = id.into();
        if id.is_empty() {
            self.cell.update_idle(|current| current.clear());
            return false;
        }
        match self.cell.update(|current| *current = id) {
            Some((ticket, id)) => {
                self.run(ticket, id).await;
                true
            }
            None => false,
        }
    }

    async fn run(&self, ticket: FetchTicket, id: String) {
        tracing::debug!(patient_id = %id, "Loading patient details");
        let result = tokio::try_join!(
            self.api.get_patient(&id),
            self.api.get_patient_records(&id)
        )
        .map(|(patient, records)| PatientDetail {
            patient: Some(patient),
            records,
        });
        self.cell.settle(ticket, result);
    }
}
