use serde::{Deserialize, Serialize};

use super::enums::{ConsentPurpose, ConsentStatus};
use super::null_as_default;

/// A consent record as stored by the backend.
///
/// `purpose` stays a plain string on the wire so records created by other
/// clients with purposes outside the form's fixed set still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub patient_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub purpose: String,
    pub status: ConsentStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wallet_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub signature: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_tx_hash: Option<String>,
}

impl Consent {
    /// The purpose as one of the fixed form options, if it is one.
    pub fn purpose_kind(&self) -> Option<ConsentPurpose> {
        self.purpose.parse().ok()
    }

    pub fn is_pending(&self) -> bool {
        self.status == ConsentStatus::Pending
    }
}

/// Body of the create-consent request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConsent {
    #[serde(deserialize_with = "null_as_default")]
    pub patient_id: String,
    pub purpose: ConsentPurpose,
    #[serde(deserialize_with = "null_as_default")]
    pub wallet_address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub signature: String,
}

/// Body of the update-consent request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentUpdate {
    pub status: ConsentStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub blockchain_tx_hash: String,
}
