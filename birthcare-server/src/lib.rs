//! birthcare-server - console service for birthcare facilities
//!
//! Sits in front of the birthcare REST API, forwarding the caller's bearer
//! token, and owns the discharge workflow state and the audit trail.

pub mod audit;
pub mod auth;
pub mod config;
pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, patch, post},
    Router,
};
use birthcare_client::{ApiClient, ClientError, DocumentRenderer, SummaryRenderer};
use birthcare_core::{DischargeRoutes, DischargeWorkflow};
use birthcare_store::{
    AuditLog, DischargeStore, RedbDischargeStore, SqliteDischargeStore, StoreError,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use config::{ServerConfig, StoreBackend};

const BODY_LIMIT: usize = 16 * 1024 * 1024; // 16MB

/// Application state
pub struct AppState {
    /// Client without credentials; handlers use `with_token` per request
    pub upstream: ApiClient,
    /// Held across read, advance and write of one admission's progress
    pub discharge: Mutex<Box<dyn DischargeStore>>,
    pub audit: Arc<Mutex<AuditLog>>,
    pub config: ServerConfig,
    pub workflow: DischargeWorkflow,
    pub renderer: Box<dyn DocumentRenderer>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        discharge: Box<dyn DischargeStore>,
        audit: AuditLog,
    ) -> Result<Self, ClientError> {
        let upstream = ApiClient::new(config.client_config())?;
        let workflow = DischargeWorkflow::new(DischargeRoutes::new(
            config.workflow.route_prefix.clone(),
        ));
        Ok(Self {
            upstream,
            discharge: Mutex::new(discharge),
            audit: Arc::new(Mutex::new(audit)),
            config,
            workflow,
            renderer: Box::new(SummaryRenderer),
        })
    }
}

/// Open the discharge store for the configured backend
pub fn open_discharge_store(config: &ServerConfig) -> Result<Box<dyn DischargeStore>, StoreError> {
    let path = config.discharge_db_path();
    let store: Box<dyn DischargeStore> = match config.storage.backend {
        StoreBackend::Sqlite => Box::new(SqliteDischargeStore::open(path)?),
        StoreBackend::Redb => Box::new(RedbDischargeStore::open(path)?),
    };
    Ok(store)
}

/// Build the application router with all routes and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::metadata::health_check))
        .route("/status", get(handlers::metadata::status))
        // Admin review
        .route(
            "/api/admin/birthcare-applications",
            get(handlers::applications::list),
        )
        .route(
            "/api/admin/birthcare-applications/{id}/approve",
            post(handlers::applications::approve),
        )
        .route(
            "/api/admin/birthcare-applications/{id}/reject",
            post(handlers::applications::reject),
        )
        // Facility owner
        .route(
            "/api/owner/birthcare",
            get(handlers::facility::show).put(handlers::facility::update),
        )
        .route(
            "/api/owner/birthcare/{id}/resubmit",
            post(handlers::facility::resubmit),
        )
        .route(
            "/api/owner/birthcare/{id}/documents",
            post(handlers::facility::upload_document),
        )
        .route(
            "/api/owner/dashboard/statistics",
            get(handlers::facility::dashboard),
        )
        // Admissions and discharge
        .route(
            "/api/birthcare/{id}/patient-admissions",
            get(handlers::admissions::list).post(handlers::admissions::create),
        )
        .route(
            "/api/birthcare/{id}/patient-admissions/{admission_id}/status",
            patch(handlers::admissions::update_status),
        )
        .route(
            "/api/birthcare/{id}/patient-admissions/{admission_id}/discharge",
            get(handlers::admissions::discharge_progress),
        )
        // Reference data
        .route("/api/birthcare/{id}/rooms", get(handlers::reference::rooms))
        .route(
            "/api/birthcare/{id}/rooms/{room_id}/beds",
            get(handlers::reference::beds),
        )
        .route("/api/birthcare/{id}/staff", get(handlers::reference::staff))
        .route(
            "/api/birthcare/{id}/patients",
            get(handlers::reference::patients),
        )
        // Clinical records
        .route(
            "/api/birthcare/{id}/birth-details",
            post(handlers::birth_details::save),
        )
        .route(
            "/api/birthcare/{id}/patient-documents/from-data",
            post(handlers::birth_details::save_document),
        )
        .route(
            "/api/birthcare/{id}/newborn-screenings",
            post(handlers::screening::save),
        )
        .route(
            "/api/birthcare/{id}/prenatal-visits",
            get(handlers::prenatal::list).post(handlers::prenatal::create),
        )
        // Billing
        .route(
            "/api/birthcare/{id}/payments/soa",
            get(handlers::billing::statement),
        )
        .route(
            "/api/birthcare/{id}/payments/soa/pdf",
            get(handlers::billing::statement_pdf),
        )
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state(config: ServerConfig) -> Arc<AppState> {
        let discharge = Box::new(SqliteDischargeStore::open(":memory:").unwrap());
        let audit = AuditLog::open(":memory:").unwrap();
        Arc::new(AppState::new(config, discharge, audit).unwrap())
    }

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let app = build_router(test_state(ServerConfig::default()));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_status_requires_token_when_auth_required() {
        let app = build_router(test_state(ServerConfig::default()));
        let response = app
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_open_discharge_store_per_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = ServerConfig::default();
        config.storage.data_dir = dir.path().to_path_buf();

        open_discharge_store(&config).unwrap();
        assert!(dir.path().join("discharge.sqlite").exists());

        config.storage.backend = StoreBackend::Redb;
        open_discharge_store(&config).unwrap();
        assert!(dir.path().join("discharge.redb").exists());
    }
}
