//! Consent creation and activation.
//!
//! Creating a consent is sign-then-submit: the wallet signs a fixed text
//! built from the form, and the signature travels with the create request.
//! Validation happens before the wallet or the backend is touched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::ApiError;
use crate::models::{Consent, ConsentPurpose, NewConsent, StatusFilter};
use crate::resources::ConsentsResource;
use crate::wallet::{WalletError, WalletSigner};

/// Stand-in transaction hash used until consents are anchored on-chain.
pub const MOCK_TX_HASH: &str = "0x-mock-tx-hash";

#[derive(Debug, thiserror::Error)]
pub enum ConsentFlowError {
    #[error("Please connect your wallet first")]
    WalletNotConnected,

    #[error("Please complete all fields")]
    IncompleteForm,

    #[error("A consent submission is already in progress")]
    InProgress,

    #[error("Failed to create consent: {0}")]
    Signing(#[source] WalletError),

    #[error("Failed to create consent: {0}")]
    Submit(#[source] ApiError),

    #[error("Failed to update consent: {0}")]
    Update(#[source] ApiError),
}

/// The create-consent form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsentForm {
    pub patient_id: String,
    pub purpose: Option<ConsentPurpose>,
}

impl ConsentForm {
    /// Both fields filled in, with surrounding whitespace ignored.
    pub fn validated(&self) -> Option<(String, ConsentPurpose)> {
        let patient_id = self.patient_id.trim();
        match self.purpose {
            Some(purpose) if !patient_id.is_empty() => Some((patient_id.to_string(), purpose)),
            _ => None,
        }
    }
}

/// The exact text the wallet signs for a consent.
pub fn consent_message(purpose: ConsentPurpose, patient_id: &str) -> String {
    format!("I consent to: {purpose} for patient: {patient_id}")
}

/// Holds the submitting flag; releases it on drop, including when the
/// submit future is cancelled mid-flight.
struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        (!flag.swap(true, Ordering::AcqRel)).then_some(Self(flag))
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives the consent form against a consent list and a wallet.
pub struct ConsentManager {
    consents: ConsentsResource,
    wallet: Arc<dyn WalletSigner>,
    form: Mutex<ConsentForm>,
    submitting: AtomicBool,
}

impl ConsentManager {
    pub fn new(consents: ConsentsResource, wallet: Arc<dyn WalletSigner>) -> Self {
        Self {
            consents,
            wallet,
            form: Mutex::new(ConsentForm::default()),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn consents(&self) -> &ConsentsResource {
        &self.consents
    }

    pub fn account(&self) -> Option<String> {
        self.wallet.account()
    }

    fn lock_form(&self) -> std::sync::MutexGuard<'_, ConsentForm> {
        self.form.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn form(&self) -> ConsentForm {
        self.lock_form().clone()
    }

    pub fn set_patient_id(&self, patient_id: impl Into<String>) {
        self.lock_form().patient_id = patient_id.into();
    }

    pub fn set_purpose(&self, purpose: Option<ConsentPurpose>) {
        self.lock_form().purpose = purpose;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub async fn set_status_filter(&self, status: StatusFilter) -> bool {
        self.consents.set_status_filter(status).await
    }

    /// Sign and create a consent from the current form.
    ///
    /// On success the form is cleared and the list refreshed. On failure
    /// both are left as they were.
    pub async fn submit(&self) -> Result<Consent, ConsentFlowError> {
        let account = self
            .wallet
            .account()
            .filter(|a| !a.is_empty())
            .ok_or(ConsentFlowError::WalletNotConnected)?;
        let (patient_id, purpose) = self
            .form()
            .validated()
            .ok_or(ConsentFlowError::IncompleteForm)?;

        let Some(_submitting) = SubmitGuard::acquire(&self.submitting) else {
            return Err(ConsentFlowError::InProgress);
        };
        let result = self.sign_and_create(account, patient_id, purpose).await;

        if result.is_ok() {
            *self.lock_form() = ConsentForm::default();
        }
        result
    }

    async fn sign_and_create(
        &self,
        account: String,
        patient_id: String,
        purpose: ConsentPurpose,
    ) -> Result<Consent, ConsentFlowError> {
        let message = consent_message(purpose, &patient_id);
        let signature = self.wallet.sign_message(&message).await.map_err(|err| {
            tracing::warn!(error = %err, "Consent signing failed");
            ConsentFlowError::Signing(err)
        })?;

        let request = NewConsent {
            patient_id,
            purpose,
            wallet_address: account,
            signature,
        };
        self.consents
            .create(&request)
            .await
            .map_err(ConsentFlowError::Submit)
    }

    /// Activate a pending consent. Without a hash the placeholder is used.
    pub async fn activate(
        &self,
        consent_id: &str,
        tx_hash: Option<&str>,
    ) -> Result<Consent, ConsentFlowError> {
        let tx_hash = tx_hash.filter(|h| !h.is_empty()).unwrap_or(MOCK_TX_HASH);
        self.consents
            .activate(consent_id, tx_hash)
            .await
            .map_err(ConsentFlowError::Update)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;
    use crate::api::mock::{consent, MockPortalApi};
    use crate::models::ConsentStatus;

    const ACCOUNT: &str = "0xABC0000000000000000000000000000000000001";

    /// Signs with a fixed value and remembers what it was asked to sign.
    struct RecordingSigner {
        account: Option<String>,
        reject: bool,
        signed: StdMutex<Vec<String>>,
    }

    impl RecordingSigner {
        fn connected() -> Self {
            Self {
                account: Some(ACCOUNT.to_string()),
                reject: false,
                signed: StdMutex::new(Vec::new()),
            }
        }

        fn signed(&self) -> Vec<String> {
            self.signed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WalletSigner for RecordingSigner {
        fn account(&self) -> Option<String> {
            self.account.clone()
        }

        async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
            self.signed.lock().unwrap().push(message.to_string());
            if self.reject {
                return Err(WalletError::Rejected("User denied message signature".into()));
            }
            Ok("0xsigned".to_string())
        }
    }

    fn setup(signer: RecordingSigner) -> (Arc<MockPortalApi>, Arc<RecordingSigner>, ConsentManager) {
        let api = Arc::new(MockPortalApi::new().with_consents(vec![consent(
            "c-1",
            ConsentStatus::Active,
            "2024-01-10T09:00:00Z",
        )]));
        let signer = Arc::new(signer);
        let consents = ConsentsResource::new(api.clone(), None, StatusFilter::All);
        let manager = ConsentManager::new(consents, signer.clone());
        (api, signer, manager)
    }

    #[test]
    fn message_is_exact() {
        assert_eq!(
            consent_message(ConsentPurpose::ResearchStudy, "patient-001"),
            "I consent to: Research Study Participation for patient: patient-001"
        );
    }

    #[test]
    fn form_requires_both_fields() {
        let mut form = ConsentForm::default();
        assert!(form.validated().is_none());
        form.patient_id = "   ".into();
        form.purpose = Some(ConsentPurpose::InsuranceProvider);
        assert!(form.validated().is_none());
        form.patient_id = " patient-001 ".into();
        assert_eq!(
            form.validated(),
            Some(("patient-001".to_string(), ConsentPurpose::InsuranceProvider))
        );
    }

    #[tokio::test]
    async fn submit_signs_creates_and_refreshes() {
        let (api, signer, manager) = setup(RecordingSigner::connected());
        manager.consents().load().await;
        manager.set_patient_id("patient-001");
        manager.set_purpose(Some(ConsentPurpose::ResearchStudy));

        let created = manager.submit().await.unwrap();

        assert_eq!(
            signer.signed(),
            vec!["I consent to: Research Study Participation for patient: patient-001"]
        );
        assert!(api.calls().contains(&format!(
            "create_consent(patient-001,Research Study Participation,{ACCOUNT},0xsigned)"
        )));
        assert_eq!(created.status, ConsentStatus::Pending);

        let list = manager.consents().snapshot().data;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, created.id);
        assert!(list[0].is_pending());
        assert_eq!(list[0].signature, "0xsigned");

        assert_eq!(manager.form(), ConsentForm::default());
        assert!(!manager.is_submitting());
    }

    #[tokio::test]
    async fn missing_wallet_fails_before_any_call() {
        let signer = RecordingSigner {
            account: None,
            ..RecordingSigner::connected()
        };
        let (api, signer, manager) = setup(signer);
        manager.set_patient_id("patient-001");
        manager.set_purpose(Some(ConsentPurpose::ResearchStudy));

        let err = manager.submit().await.unwrap_err();
        assert!(matches!(err, ConsentFlowError::WalletNotConnected));
        assert_eq!(err.to_string(), "Please connect your wallet first");
        assert!(signer.signed().is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn incomplete_form_fails_before_any_call() {
        let (api, signer, manager) = setup(RecordingSigner::connected());
        manager.set_patient_id("patient-001");

        let err = manager.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "Please complete all fields");
        assert!(signer.signed().is_empty());
        assert!(api.calls().is_empty());
        assert_eq!(manager.form().patient_id, "patient-001");
    }

    #[tokio::test]
    async fn rejected_signature_keeps_form() {
        let signer = RecordingSigner {
            reject: true,
            ..RecordingSigner::connected()
        };
        let (api, _signer, manager) = setup(signer);
        manager.set_patient_id("patient-001");
        manager.set_purpose(Some(ConsentPurpose::ThirdPartyAnalytics));

        let err = manager.submit().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to create consent: Signature request rejected: User denied message signature"
        );
        assert_eq!(api.call_count("create_consent"), 0);
        assert_eq!(manager.form().purpose, Some(ConsentPurpose::ThirdPartyAnalytics));
    }

    #[tokio::test]
    async fn backend_failure_is_reported_and_form_kept() {
        let (api, _signer, manager) = setup(RecordingSigner::connected());
        api.fail("create_consent");
        manager.set_patient_id("patient-001");
        manager.set_purpose(Some(ConsentPurpose::ResearchDataSharing));

        let err = manager.submit().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to create consent: create_consent unavailable"
        );
        assert_eq!(manager.form().patient_id, "patient-001");
        assert_eq!(api.consents().len(), 1);
        assert_eq!(api.call_count("get_consents"), 0);
    }

    /// Never answers the first signature request; signs normally after that.
    struct StallingSigner {
        stalled: AtomicBool,
    }

    #[async_trait]
    impl WalletSigner for StallingSigner {
        fn account(&self) -> Option<String> {
            Some(ACCOUNT.to_string())
        }

        async fn sign_message(&self, _message: &str) -> Result<String, WalletError> {
            if !self.stalled.swap(true, Ordering::AcqRel) {
                std::future::pending::<()>().await;
            }
            Ok("0xsigned".to_string())
        }
    }

    #[tokio::test]
    async fn cancelled_submit_releases_in_progress_flag() {
        let api = Arc::new(MockPortalApi::new());
        let consents = ConsentsResource::new(api.clone(), None, StatusFilter::All);
        let signer = Arc::new(StallingSigner {
            stalled: AtomicBool::new(false),
        });
        let manager = ConsentManager::new(consents, signer);
        manager.set_patient_id("patient-001");
        manager.set_purpose(Some(ConsentPurpose::ResearchStudy));

        let abandoned =
            tokio::time::timeout(std::time::Duration::from_millis(50), manager.submit()).await;
        assert!(abandoned.is_err());
        assert!(!manager.is_submitting());

        let created = manager.submit().await.unwrap();
        assert_eq!(created.patient_id, "patient-001");
        assert_eq!(api.call_count("create_consent"), 1);
    }

    #[tokio::test]
    async fn activate_defaults_to_placeholder_hash() {
        let (api, _signer, manager) = setup(RecordingSigner::connected());
        let updated = manager.activate("c-1", None).await.unwrap();
        assert_eq!(updated.blockchain_tx_hash.as_deref(), Some(MOCK_TX_HASH));

        manager.activate("c-1", Some("0xabc")).await.unwrap();
        assert!(api.calls().contains(&"update_consent(c-1,active,0xabc)".to_string()));
    }

    #[tokio::test]
    async fn activate_failure_message() {
        let (api, _signer, manager) = setup(RecordingSigner::connected());
        api.fail("update_consent");
        let err = manager.activate("c-1", None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to update consent: update_consent unavailable"
        );
    }
}
