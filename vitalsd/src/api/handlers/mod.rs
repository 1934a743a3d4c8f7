//! HTTP request handlers.
//!
//! - [`analysis`]: the four biosignal interpretation endpoints
//! - [`health`]: liveness probe
//!
//! # Error Handling
//!
//! Analysis handlers return [`crate::errors::AnalysisFailure`], which converts to the endpoint's
//! JSON body with the matching HTTP status.

pub mod analysis;
pub mod health;
