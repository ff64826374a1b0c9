use std::fmt;

use serde::Serialize;

use super::{field_line, Screen};
use crate::format::{format_date, truncate_address, DateStyle};
use crate::models::{MedicalRecord, Patient};
use crate::resources::{PatientDetail, PatientDetailResource};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub date_of_birth: String,
    pub gender: String,
    pub phone: String,
    pub address: String,
    pub wallet: String,
}

impl From<&Patient> for PatientInfo {
    fn from(p: &Patient) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            email: p.email.clone(),
            date_of_birth: format_date(&p.date_of_birth, DateStyle::Short),
            gender: p.gender.clone(),
            phone: p.phone.clone(),
            address: p.address.clone(),
            wallet: p.wallet_address.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordRow {
    pub id: String,
    pub record_type: String,
    pub title: String,
    pub date: String,
    pub doctor: String,
    pub hospital: String,
    pub status: String,
    pub blockchain_hash: Option<String>,
}

impl From<&MedicalRecord> for RecordRow {
    fn from(r: &MedicalRecord) -> Self {
        Self {
            id: r.id.clone(),
            record_type: r.record_type.clone(),
            title: r.title.clone(),
            date: format_date(&r.date, DateStyle::Short),
            doctor: r.doctor.clone(),
            hospital: r.hospital.clone(),
            status: r.status.clone(),
            blockchain_hash: r.blockchain_hash.as_deref().map(truncate_address),
        }
    }
}

/// `patient` is `None` when the backend returned nothing for the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientDetailView {
    pub patient: Option<PatientInfo>,
    pub records: Vec<RecordRow>,
}

impl PatientDetailView {
    pub fn build(resource: &PatientDetailResource) -> Screen<Self> {
        Screen::from_snapshot(&resource.snapshot(), "patient details", Self::from_detail)
    }

    fn from_detail(detail: &PatientDetail) -> Self {
        Self {
            patient: detail.patient.as_ref().map(PatientInfo::from),
            records: detail.records.iter().map(RecordRow::from).collect(),
        }
    }
}

impl fmt::Display for PatientDetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(patient) = &self.patient else {
            return writeln!(f, "Patient not found");
        };

        writeln!(f, "Patient Information")?;
        field_line(f, "Name", &patient.name)?;
        field_line(f, "Email", &patient.email)?;
        field_line(f, "Date of Birth", &patient.date_of_birth)?;
        field_line(f, "Gender", &patient.gender)?;
        field_line(f, "Phone", &patient.phone)?;
        field_line(f, "Address", &patient.address)?;
        field_line(f, "Wallet", &patient.wallet)?;

        writeln!(f, "Medical Records ({})", self.records.len())?;
        if self.records.is_empty() {
            return writeln!(f, "  No medical records found");
        }
        for record in &self.records {
            writeln!(f, "- {} ({})", record.title, record.record_type)?;
            field_line(f, "Date", &record.date)?;
            field_line(f, "Doctor", &record.doctor)?;
            field_line(f, "Hospital", &record.hospital)?;
            field_line(f, "Status", &record.status)?;
            if let Some(hash) = &record.blockchain_hash {
                field_line(f, "Hash", hash)?;
            }
        }
        Ok(())
    }
}
