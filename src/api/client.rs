use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::normalize::{unwrap_list, unwrap_patient_page};
use super::{ApiError, PortalApi};
use crate::config::PortalConfig;
use crate::models::{
    Consent, ConsentStatus, ConsentUpdate, MedicalRecord, NewConsent, Patient, PatientPage,
    Stats, Transaction,
};

/// Header carrying a per-request correlation id.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for the consent platform REST API.
pub struct HttpPortalApi {
    base_url: Url,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpPortalApi {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim().trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &PortalConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.request_timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Base URL extended with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = self.endpoint(segments)?;
        self.execute(Method::GET, self.client.get(url).query(query))
            .await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(segments)?;
        let request = self.client.request(method.clone(), url).json(body);
        self.execute(method, request).await
    }

    async fn execute(&self, method: Method, request: RequestBuilder) -> Result<Value, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        let request = request
            .header(REQUEST_ID_HEADER, &request_id)
            .build()
            .map_err(|e| ApiError::Http(e.to_string()))?;
        let url = request.url().clone();

        tracing::debug!(%method, %url, request_id = %request_id, "API request");

        let response = self.client.execute(request).await.map_err(|e| {
            if e.is_connect() {
                ApiError::Connection(self.base_url.to_string())
            } else if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%method, %url, status = status.as_u16(), request_id = %request_id, "API request failed");
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn get_patients(
        &self,
        page: u32,
        limit: u32,
        search: &str,
    ) -> Result<PatientPage, ApiError> {
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if !search.is_empty() {
            query.push(("search", search.to_string()));
        }
        Ok(unwrap_patient_page(self.get(&["patients"], &query).await?))
    }

    async fn get_patient(&self, id: &str) -> Result<Patient, ApiError> {
        decode(self.get(&["patients", id], &[]).await?)
    }

    async fn get_patient_records(&self, id: &str) -> Result<Vec<MedicalRecord>, ApiError> {
        Ok(unwrap_list(self.get(&["patients", id, "records"], &[]).await?, "records"))
    }

    async fn get_consents(
        &self,
        patient_id: Option<&str>,
        status: Option<ConsentStatus>,
    ) -> Result<Vec<Consent>, ApiError> {
        let mut query = Vec::new();
        if let Some(patient_id) = patient_id {
            query.push(("patientId", patient_id.to_string()));
        }
        if let Some(status) = status {
            query.push(("status", status.as_str().to_string()));
        }
        Ok(unwrap_list(self.get(&["consents"], &query).await?, "consents"))
    }

    async fn create_consent(&self, consent: &NewConsent) -> Result<Consent, ApiError> {
        decode(self.send(Method::POST, &["consents"], consent).await?)
    }

    async fn update_consent(&self, id: &str, update: &ConsentUpdate) -> Result<Consent, ApiError> {
        decode(self.send(Method::PATCH, &["consents", id], update).await?)
    }

    async fn get_transactions(
        &self,
        wallet: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Transaction>, ApiError> {
        let mut query = Vec::new();
        if let Some(wallet) = wallet {
            query.push(("walletAddress", wallet.to_string()));
        }
        query.push(("limit", limit.to_string()));
        Ok(unwrap_list(self.get(&["transactions"], &query).await?, "transactions"))
    }

    async fn get_stats(&self) -> Result<Stats, ApiError> {
        decode(self.get(&["stats"], &[]).await?)
    }
}
