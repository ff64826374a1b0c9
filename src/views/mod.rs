//! View models for each screen.
//!
//! A view is built from a resource snapshot and renders as plain text via
//! `Display`. Every screen has the same three states: loading wins over
//! error, error wins over data.

pub mod consents;
pub mod patient_detail;
pub mod patients;
pub mod stats;
pub mod transactions;

use std::fmt;

use serde::Serialize;

use crate::resources::ResourceSnapshot;

pub use consents::{ConsentListView, ConsentRow};
pub use patient_detail::{PatientDetailView, PatientInfo, RecordRow};
pub use patients::{PatientListView, PatientRow};
pub use stats::{StatItem, StatsView};
pub use transactions::{TransactionListView, TransactionRow};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "view", rename_all = "snake_case")]
pub enum Screen<T> {
    /// Names the thing being loaded, e.g. `patients`.
    Loading(&'static str),
    Error(String),
    Ready(T),
}

impl<T> Screen<T> {
    pub fn from_snapshot<D, F>(snapshot: &ResourceSnapshot<D>, thing: &'static str, build: F) -> Self
    where
        F: FnOnce(&D) -> T,
    {
        if snapshot.loading {
            Screen::Loading(thing)
        } else if let Some(error) = &snapshot.error {
            Screen::Error(error.clone())
        } else {
            Screen::Ready(build(&snapshot.data))
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Screen::Ready(view) => Some(view),
            _ => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Screen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Loading(thing) => write!(f, "Loading {thing}..."),
            Screen::Error(message) => write!(f, "Error: {message}"),
            Screen::Ready(view) => view.fmt(f),
        }
    }
}

/// `label: value` line, skipped when the value is empty.
pub(crate) fn field_line(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    if value.is_empty() {
        return Ok(());
    }
    writeln!(f, "  {label}: {value}")
}
