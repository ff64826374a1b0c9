use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Platform-wide counters. Missing counters read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    #[serde(deserialize_with = "null_as_default")]
    pub total_patients: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_records: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_consents: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub active_consents: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub pending_consents: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_transactions: u64,
}
