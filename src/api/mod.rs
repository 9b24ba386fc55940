//! API module for DevEvent
//!
//! This module contains the JSON API, the server-rendered pages, health
//! checks and the server setup with its request handling middleware.

pub mod bookings;
pub mod events;
pub mod health;
pub mod pages;
pub mod server;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::error::Error;
use crate::service::EventService;
use crate::upload::ImageStore;

pub use health::{
    build_info, health_check, ready_check, BuildInfo, ComponentHealth, HealthResponse, HealthStatus,
    ReadyResponse, BUILD_INFO,
};
pub use server::{create_router, create_server, shutdown_signal};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: EventService,
    pub images: Arc<dyn ImageStore>,
    /// Include underlying error messages in 500 responses (development only)
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(service: EventService, images: Arc<dyn ImageStore>) -> Self {
        Self {
            service,
            images,
            expose_error_details: false,
        }
    }

    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }

    /// `{ success: false, error }` with the status matching `err`.
    ///
    /// Server-side failures are logged and reported as `fallback` unless
    /// error details are exposed.
    pub fn failure(&self, err: &Error, fallback: &str) -> Response {
        err.log();
        let body = json!({
            "success": false,
            "error": err.public_message(fallback, self.expose_error_details),
        });
        (err.status_code(), Json(body)).into_response()
    }
}

/// `{ success: true, data }` with 200 OK
pub fn success<T: serde::Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}
