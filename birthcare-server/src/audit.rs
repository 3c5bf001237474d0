use axum::extract::ConnectInfo;
use axum::http::{request::Parts, Extensions};
use birthcare_store::{Action, AuditLog};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::auth::AuthUser;

/// Audit context extracted from HTTP request
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub user_id: Option<String>,
    pub client_ip: String,
}

impl AuditContext {
    pub fn new(user_id: Option<String>, client_ip: String) -> Self {
        Self { user_id, client_ip }
    }

    pub fn from_parts(parts: &Parts) -> Self {
        let user_id = parts
            .extensions
            .get::<AuthUser>()
            .and_then(|u| u.user_id.clone());

        Self {
            user_id,
            client_ip: Self::client_ip(&parts.extensions),
        }
    }

    pub fn client_ip(extensions: &Extensions) -> String {
        extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Log a successful console action
pub fn log_action_success(
    context: &AuditContext,
    action: Action,
    target_type: &str,
    target_id: &str,
    detail: Option<&str>,
    audit_log: &Arc<Mutex<AuditLog>>,
) {
    tracing::info!(
        user_id = context.user_id.as_deref().unwrap_or("anonymous"),
        client_ip = %context.client_ip,
        action = action.as_str(),
        target_type = target_type,
        target_id = target_id,
        detail = detail.unwrap_or(""),
        status = "success",
        "Audit: {} {}/{}",
        action.as_str(),
        target_type,
        target_id
    );

    // Write to database asynchronously in a spawned task
    let context = context.clone();
    let target_type = target_type.to_string();
    let target_id = target_id.to_string();
    let detail = detail.map(str::to_string);
    let audit_log = Arc::clone(audit_log);

    tokio::spawn(async move {
        let audit = audit_log.lock().await;
        if let Err(e) = audit.log_success(
            action,
            &target_type,
            &target_id,
            detail.as_deref(),
            context.user_id.as_deref(),
            Some(&context.client_ip),
        ) {
            tracing::error!("Failed to write audit log to database: {}", e);
        }
    });
}

/// Log a failed console action
pub fn log_action_error(
    context: &AuditContext,
    action: Action,
    target_type: &str,
    target_id: Option<&str>,
    error: &str,
    audit_log: &Arc<Mutex<AuditLog>>,
) {
    tracing::warn!(
        user_id = context.user_id.as_deref().unwrap_or("anonymous"),
        client_ip = %context.client_ip,
        action = action.as_str(),
        target_type = target_type,
        target_id = target_id.unwrap_or("N/A"),
        status = "error",
        error = error,
        "Audit: {} {} failed: {}",
        action.as_str(),
        target_type,
        error
    );

    let context = context.clone();
    let target_type = target_type.to_string();
    let target_id = target_id.map(str::to_string);
    let error = error.to_string();
    let audit_log = Arc::clone(audit_log);

    tokio::spawn(async move {
        let audit = audit_log.lock().await;
        if let Err(e) = audit.log_error(
            action,
            Some(&target_type),
            target_id.as_deref(),
            context.user_id.as_deref(),
            Some(&context.client_ip),
            &error,
        ) {
            tracing::error!("Failed to write audit log to database: {}", e);
        }
    });
}

/// Log an authentication attempt
pub fn log_auth_attempt(client_ip: &str, user_id: Option<&str>, success: bool) {
    if success {
        tracing::debug!(
            user_id = user_id.unwrap_or("unknown"),
            client_ip = %client_ip,
            status = "success",
            "Audit: Authentication successful"
        );
    } else {
        tracing::warn!(
            client_ip = %client_ip,
            status = "failed",
            "Audit: Authentication failed"
        );
    }
}
