//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for the analysis and health endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - `POST /analyze`: ECG voltages, answered under `comment`
//! - `POST /analyze_heart`: heart-rate series, answered under `heart_interpretation`
//! - `POST /analyze_glucose`: glucose readings, answered under `interpretation`
//! - `POST /analyze_hrv_rr`: RR intervals, answered under `hrv_interpretation`
//! - `GET /healthz`: liveness
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`. API documentation is
//! available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
