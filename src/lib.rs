//! DevEvent Library
//!
//! Event listing and booking: the query layer, its validators and storage,
//! and the HTTP surface built on top of them. Exposed as a library for the
//! binary and for integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod service;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod upload;
pub mod views;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use service::EventService;

// Re-export model types
pub use models::{
    Booking, BookingInput, Event, EventInput, EventMode, ValidationError, ValidationErrorKind,
};

// Re-export API server functions
pub use api::server::{create_router, create_server, shutdown_signal};
pub use api::AppState;

// Re-export health check types
pub use api::{BuildInfo, ComponentHealth, HealthResponse, HealthStatus, ReadyResponse};
