//! Health check endpoints for DevEvent
//!
//! Liveness, readiness (which asks the database) and build information.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::AppState;
use crate::service::EventService;

/// Build information populated at compile time
pub const BUILD_INFO: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    commit: match option_env!("GIT_COMMIT") {
        Some(commit) => commit,
        None => "unknown",
    },
    build_time: match option_env!("BUILD_TIME") {
        Some(time) => time,
        None => "unknown",
    },
};

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Liveness body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
}

/// Result of probing one dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    pub message: String,
    pub checked_at: DateTime<Utc>,
}

impl ComponentHealth {
    fn healthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: message.into(),
            checked_at: Utc::now(),
        }
    }

    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: message.into(),
            checked_at: Utc::now(),
        }
    }
}

/// Readiness body; unhealthy as soon as one component is
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: HealthStatus,
    pub checks: BTreeMap<String, ComponentHealth>,
    pub timestamp: DateTime<Utc>,
}

impl ReadyResponse {
    fn from_checks(checks: BTreeMap<String, ComponentHealth>) -> Self {
        let status = if checks.values().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        Self {
            status,
            checks,
            timestamp: Utc::now(),
        }
    }
}

/// `GET /healthz`, always 200 while the process serves requests
pub async fn health_check() -> Response {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        timestamp: Utc::now(),
    })
    .into_response()
}

/// `GET /readyz`
///
/// Ready once the database connection can be opened and answers a query.
/// The first probe may be the one that opens the connection.
pub async fn ready_check(State(state): State<AppState>) -> Response {
    let mut checks = BTreeMap::new();
    checks.insert("database".to_string(), check_database(&state.service).await);

    let response = ReadyResponse::from_checks(checks);
    (response.status.status_code(), Json(response)).into_response()
}

/// `GET /build`
pub async fn build_info() -> Response {
    Json(&BUILD_INFO).into_response()
}

async fn check_database(service: &EventService) -> ComponentHealth {
    match service.health_check().await {
        Ok(()) => ComponentHealth::healthy("Database is reachable"),
        Err(e) => {
            tracing::warn!(error = %e, "Database readiness check failed");
            ComponentHealth::unhealthy(e.to_string())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MemoryStore;
    use crate::upload::LocalImageStore;
    use std::sync::Arc;

    fn state(store: &MemoryStore) -> AppState {
        let service = EventService::new(Arc::new(store.clone()), Arc::new(store.clone()));
        AppState::new(service, Arc::new(LocalImageStore::new("/tmp", "/uploads")))
    }

    #[tokio::test]
    async fn test_health_check_endpoint() {
        let response = health_check().await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_check_follows_database() {
        let store = MemoryStore::new();

        let response = ready_check(State(state(&store))).await;
        assert_eq!(response.status(), StatusCode::OK);

        store.fail_next_operation("connection refused");
        let response = ready_check(State(state(&store))).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_ready_response_aggregates_checks() {
        let mut checks = BTreeMap::new();
        checks.insert("database".to_string(), ComponentHealth::healthy("ok"));
        assert_eq!(ReadyResponse::from_checks(checks.clone()).status, HealthStatus::Healthy);

        checks.insert("images".to_string(), ComponentHealth::unhealthy("disk full"));
        assert_eq!(ReadyResponse::from_checks(checks).status, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_build_info_is_populated() {
        assert_eq!(BUILD_INFO.version, env!("CARGO_PKG_VERSION"));
        assert!(!BUILD_INFO.commit.is_empty());
    }
}
