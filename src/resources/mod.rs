//! Per-resource data handles.
//!
//! Each resource pairs the shared API with a `ResourceCell` holding its
//! trigger inputs and `{data, loading, error}` snapshot. Setters that
//! change the inputs start a new fetch; results from superseded fetches
//! are dropped.

pub mod cell;
pub mod consents;
pub mod patient_detail;
pub mod patients;
pub mod stats;
pub mod transactions;

pub use cell::{FetchTicket, ResourceCell, ResourceSnapshot};
pub use consents::{sort_newest_first, ConsentQuery, ConsentsResource};
pub use patient_detail::{PatientDetail, PatientDetailResource};
pub use patients::{Pagination, PatientQuery, PatientsResource, PATIENTS_PAGE_SIZE};
pub use stats::StatsResource;
pub use transactions::{TransactionQuery, TransactionsResource};
