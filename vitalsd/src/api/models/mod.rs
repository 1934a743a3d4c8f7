//! API request/response models.
//!
//! Request bodies are parsed leniently by [`crate::analysis::validate`], so the request types here
//! describe the accepted shape for the OpenAPI document rather than drive deserialization.

pub mod analysis;
