use std::fmt;

use serde::Serialize;

use super::Screen;
use crate::format::{format_date, truncate_address, DateStyle};
use crate::models::Patient;
use crate::resources::{Pagination, PatientsResource};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub gender: String,
    pub phone: String,
    pub date_of_birth: String,
    pub wallet: String,
}

impl From<&Patient> for PatientRow {
    fn from(p: &Patient) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            email: p.email.clone(),
            gender: p.gender.clone(),
            phone: p.phone.clone(),
            date_of_birth: format_date(&p.date_of_birth, DateStyle::Short),
            wallet: truncate_address(&p.wallet_address),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientListView {
    pub search: String,
    pub rows: Vec<PatientRow>,
    pub pagination: Pagination,
}

impl PatientListView {
    pub fn build(resource: &PatientsResource) -> Screen<Self> {
        let snapshot = resource.snapshot();
        let query = resource.query();
        let pagination = Pagination::new(query.page, query.limit, snapshot.data.total);
        Screen::from_snapshot(&snapshot, "patients", |page| Self {
            search: query.search.clone(),
            rows: page.patients.iter().map(PatientRow::from).collect(),
            pagination,
        })
    }

    /// `Page N of M`, only when there is more than one page.
    pub fn page_label(&self) -> Option<String> {
        self.pagination.show_controls().then(|| {
            format!(
                "Page {} of {}",
                self.pagination.page, self.pagination.total_pages
            )
        })
    }
}

impl fmt::Display for PatientListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Patients ({})", self.pagination.total)?;
        if !self.search.is_empty() {
            writeln!(f, "Search: {}", self.search)?;
        }
        if self.rows.is_empty() {
            writeln!(f, "No patients found")?;
        }
        for row in &self.rows {
            writeln!(f, "- {} [{}]", row.name, row.id)?;
            for value in [&row.email, &row.gender, &row.phone] {
                if !value.is_empty() {
                    writeln!(f, "  {value}")?;
                }
            }
        }
        if let Some(label) = self.page_label() {
            let mut controls: Vec<&str> = Vec::with_capacity(3);
            if self.pagination.has_previous() {
                controls.push("< Previous");
            }
            controls.push(label.as_str());
            if self.pagination.has_next() {
                controls.push("Next >");
            }
            writeln!(f, "{}", controls.join(" "))?;
        }
        Ok(())
    }
}
