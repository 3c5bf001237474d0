pub mod admissions;
pub mod applications;
pub mod billing;
pub mod birth_details;
pub mod facility;
pub mod metadata;
pub mod prenatal;
pub mod reference;
pub mod screening;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use birthcare_client::ClientError;
use birthcare_core::{BirthcareError, ListQuery};
use birthcare_store::StoreError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::auth::LOGIN_PATH;

/// JSON error body of every console route
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    /// Route-specific context, e.g. the discharge step that was taken
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Handler error, converted to `(status, ErrorBody)`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                message: message.into(),
                errors: None,
                login: None,
                details: Map::new(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 401 telling the front end to go to the login page
    pub fn login_required(message: impl Into<String>) -> Self {
        let mut err = Self::new(StatusCode::UNAUTHORIZED, message);
        err.body.login = Some(LOGIN_PATH.to_string());
        err
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.body.details.insert(key.to_string(), value.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::LOCATION, HeaderValue::from_static(LOGIN_PATH));
        }
        response
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let message = err.user_message();
        match err {
            ClientError::Unauthorized => ApiError::login_required(message),
            ClientError::Validation { fields, .. } => {
                let mut api = ApiError::unprocessable(message);
                if !fields.is_empty() {
                    api.body.errors = Some(fields);
                }
                api
            }
            ClientError::Status { status, .. } if status >= 500 => {
                ApiError::new(StatusCode::BAD_GATEWAY, message).with_detail("upstream_status", status)
            }
            ClientError::Status { status, .. } => {
                let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                ApiError::new(code, message)
            }
            ClientError::Transport(ref e) if e.is_timeout() => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, message)
            }
            ClientError::Transport(_) | ClientError::Decode(_) => {
                ApiError::new(StatusCode::BAD_GATEWAY, message)
            }
            ClientError::Domain(domain) => domain.into(),
            ClientError::Cancelled | ClientError::InvalidUrl(_) | ClientError::Render(_) => {
                ApiError::internal(message)
            }
        }
    }
}

impl From<BirthcareError> for ApiError {
    fn from(err: BirthcareError) -> Self {
        match err {
            BirthcareError::Validation { message } => ApiError::unprocessable(message),
            BirthcareError::UnknownStatus { .. } => ApiError::unprocessable(err.to_string()),
            BirthcareError::InvalidTransition(message) => ApiError::new(StatusCode::CONFLICT, message),
            BirthcareError::InvalidJson(e) => ApiError::bad_request(e.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Discharge store failure");
        ApiError::internal(format!("Storage error: {}", err))
    }
}

/// List query from the raw URL query string
#[allow(clippy::result_large_err)]
pub fn parse_list_query(raw: Option<String>) -> Result<ListQuery, ApiError> {
    ListQuery::parse(raw.as_deref().unwrap_or("")).map_err(ApiError::bad_request)
}
