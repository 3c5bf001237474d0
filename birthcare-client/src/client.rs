//! Typed client for the birthcare REST API
//!
//! One method per backend endpoint. Every request carries the bearer token
//! (when set) and a fresh `X-Request-Id`. Nothing is retried.

use crate::error::{ClientError, Result};
use birthcare_core::approval::is_valid_reason;
use birthcare_core::models::{
    Bed, Birthcare, BirthcareApplication, BirthcareUpdate, DashboardStatistics, Id, NewAdmission,
    NewPatientDocument, NewPrenatalVisit, Patient, PatientAdmission, PatientDocument, PrenatalVisit,
    Room, StaffMember,
};
use birthcare_core::{
    AdmissionStatus, ApprovalDecision, BirthcareError, ListQuery, NewbornScreening, Page,
    StatementOfAccount,
};
use bytes::Bytes;
use reqwest::{header, multipart, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("birthcare-console/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A file for the facility document upload
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub document_type: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Reference lists come either bare or wrapped in `{data: [...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Bare(items) | ListBody::Wrapped { data: items } => items,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|_| ClientError::InvalidUrl(base_url.clone()))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Same client, authenticated as the given bearer token
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str, accept: &'static str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(header::ACCEPT, accept)
            .header("X-Request-Id", uuid::Uuid::new_v4().to_string());
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn json_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path, "application/json")
    }

    /// Send and turn non-success statuses into errors
    async fn execute(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let body = response.bytes().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), path = %url, "Upstream request failed");
        Err(ClientError::from_response(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let body = self.execute(builder).await?.bytes().await?;
        // Mutation endpoints may answer with an empty body
        let body: &[u8] = if body.is_empty() { b"null" } else { &body };
        Ok(serde_json::from_slice(body)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(self.json_request(Method::GET, path)).await
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        Ok(self.get_json::<ListBody<T>>(path).await?.into_vec())
    }

    async fn write_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send_json(self.json_request(method, path).json(body)).await
    }

    /// Fetch one page of any list endpoint
    pub async fn list<T: DeserializeOwned>(&self, path: &str, query: &ListQuery) -> Result<Page<T>> {
        let builder = self
            .json_request(Method::GET, path)
            .query(&query.to_query_pairs());
        self.send_json(builder).await
    }

    // Admin

    pub async fn list_applications(&self, query: &ListQuery) -> Result<Page<BirthcareApplication>> {
        self.list("/api/admin/birthcare-applications", query).await
    }

    /// Approve or reject an application. Rejecting requires a non-blank reason.
    pub async fn decide_application(
        &self,
        id: Id,
        decision: ApprovalDecision,
        reason: Option<&str>,
    ) -> Result<Value> {
        let body = match decision {
            ApprovalDecision::Approve => json!({}),
            ApprovalDecision::Reject => {
                let reason = reason
                    .filter(|r| is_valid_reason(r))
                    .ok_or_else(|| BirthcareError::validation("A rejection reason is required"))?;
                json!({ "reason": reason.trim() })
            }
        };
        let path = format!(
            "/api/admin/birthcare-applications/{}/{}",
            id,
            decision.path_segment()
        );
        self.write_json(Method::POST, &path, &body).await
    }

    // Owner

    pub async fn facility(&self) -> Result<Birthcare> {
        self.get_json("/api/owner/birthcare").await
    }

    pub async fn update_facility(&self, update: &BirthcareUpdate) -> Result<Birthcare> {
        self.write_json(Method::PUT, "/api/owner/birthcare", update).await
    }

    pub async fn resubmit_facility(&self, id: Id) -> Result<Value> {
        let path = format!("/api/owner/birthcare/{}/resubmit", id);
        self.write_json(Method::POST, &path, &json!({})).await
    }

    pub async fn upload_facility_document(&self, id: Id, upload: DocumentUpload) -> Result<Value> {
        let part = multipart::Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = multipart::Form::new()
            .text("document_type", upload.document_type)
            .part("document", part);
        let path = format!("/api/owner/birthcare/{}/documents", id);
        self.send_json(self.json_request(Method::POST, &path).multipart(form))
            .await
    }

    pub async fn dashboard_statistics(&self) -> Result<DashboardStatistics> {
        self.get_json("/api/owner/dashboard/statistics").await
    }

    // Facility staff

    pub async fn list_admissions(
        &self,
        birthcare_id: Id,
        query: &ListQuery,
    ) -> Result<Page<PatientAdmission>> {
        self.list(&admissions_path(birthcare_id), query).await
    }

    pub async fn create_admission(
        &self,
        birthcare_id: Id,
        admission: &NewAdmission,
    ) -> Result<PatientAdmission> {
        let missing = admission.missing_fields();
        if !missing.is_empty() {
            return Err(BirthcareError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))
            .into());
        }
        self.write_json(Method::POST, &admissions_path(birthcare_id), admission)
            .await
    }

    /// PATCH `{status}` on one admission
    pub async fn update_admission_status(
        &self,
        birthcare_id: Id,
        admission_id: Id,
        status: AdmissionStatus,
    ) -> Result<Value> {
        let path = format!("{}/{}/status", admissions_path(birthcare_id), admission_id);
        tracing::debug!(admission_id, status = status.as_str(), "Updating admission status");
        self.write_json(Method::PATCH, &path, &json!({ "status": status }))
            .await
    }

    pub async fn rooms(&self, birthcare_id: Id) -> Result<Vec<Room>> {
        self.get_list(&format!("/api/birthcare/{}/rooms", birthcare_id))
            .await
    }

    pub async fn beds(&self, birthcare_id: Id, room_id: Id) -> Result<Vec<Bed>> {
        self.get_list(&format!("/api/birthcare/{}/rooms/{}/beds", birthcare_id, room_id))
            .await
    }

    pub async fn staff(&self, birthcare_id: Id) -> Result<Vec<StaffMember>> {
        self.get_list(&format!("/api/birthcare/{}/staff", birthcare_id))
            .await
    }

    pub async fn patients(&self, birthcare_id: Id, query: &ListQuery) -> Result<Page<Patient>> {
        self.list(&format!("/api/birthcare/{}/patients", birthcare_id), query)
            .await
    }

    pub async fn save_patient_document(
        &self,
        birthcare_id: Id,
        document: &NewPatientDocument,
    ) -> Result<PatientDocument> {
        let path = format!("/api/birthcare/{}/patient-documents/from-data", birthcare_id);
        self.write_json(Method::POST, &path, document).await
    }

    pub async fn statement_of_account(
        &self,
        birthcare_id: Id,
        patient_id: Id,
    ) -> Result<StatementOfAccount> {
        let builder = self
            .json_request(Method::GET, &soa_path(birthcare_id, ""))
            .query(&[("patient_id", patient_id)]);
        self.send_json(builder).await
    }

    /// Rendered statement as produced by the backend
    pub async fn statement_of_account_pdf(&self, birthcare_id: Id, patient_id: Id) -> Result<Bytes> {
        let builder = self
            .request(Method::GET, &soa_path(birthcare_id, "/pdf"), "application/pdf")
            .query(&[("patient_id", patient_id)]);
        Ok(self.execute(builder).await?.bytes().await?)
    }

    pub async fn list_prenatal_visits(
        &self,
        birthcare_id: Id,
        query: &ListQuery,
    ) -> Result<Page<PrenatalVisit>> {
        self.list(&prenatal_path(birthcare_id), query).await
    }

    pub async fn create_prenatal_visit(
        &self,
        birthcare_id: Id,
        visit: &NewPrenatalVisit,
    ) -> Result<PrenatalVisit> {
        self.write_json(Method::POST, &prenatal_path(birthcare_id), visit)
            .await
    }

    /// Validates the checklist structure before sending
    pub async fn save_newborn_screening(
        &self,
        birthcare_id: Id,
        screening: &NewbornScreening,
    ) -> Result<Value> {
        screening.validate()?;
        let path = format!("/api/birthcare/{}/newborn-screenings", birthcare_id);
        self.write_json(Method::POST, &path, screening).await
    }
}

fn admissions_path(birthcare_id: Id) -> String {
    format!("/api/birthcare/{}/patient-admissions", birthcare_id)
}

fn prenatal_path(birthcare_id: Id) -> String {
    format!("/api/birthcare/{}/prenatal-visits", birthcare_id)
}

fn soa_path(birthcare_id: Id, suffix: &str) -> String {
    format!("/api/birthcare/{}/payments/soa{}", birthcare_id, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            ApiClient::new(config),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_with_token_keeps_base_url() {
        let client = ApiClient::new(ClientConfig {
            base_url: "http://api.example.test/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert!(client.token().is_none());

        let authed = client.with_token("abc");
        assert_eq!(authed.token(), Some("abc"));
        assert_eq!(authed.base_url(), "http://api.example.test");
    }

    #[test]
    fn test_list_body_shapes() {
        let bare: ListBody<Room> =
            serde_json::from_str(r#"[{"id":1,"name":"Ward A"}]"#).unwrap();
        assert_eq!(bare.into_vec().len(), 1);

        let wrapped: ListBody<Room> =
            serde_json::from_str(r#"{"data":[{"id":1,"name":"Ward A"},{"id":2,"name":"Ward B"}]}"#)
                .unwrap();
        assert_eq!(wrapped.into_vec()[1].name, "Ward B");
    }
}
