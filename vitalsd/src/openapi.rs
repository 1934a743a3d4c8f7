//! OpenAPI documentation, served at `/docs`.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::analysis::analyze_ecg,
        api::handlers::analysis::analyze_heart,
        api::handlers::analysis::analyze_glucose,
        api::handlers::analysis::analyze_hrv,
        api::handlers::health::healthz,
    ),
    components(schemas(
        api::models::analysis::EcgAnalysisRequest,
        api::models::analysis::EcgAnalysisResponse,
        api::models::analysis::HeartAnalysisRequest,
        api::models::analysis::HeartAnalysisResponse,
        api::models::analysis::GlucoseReading,
        api::models::analysis::GlucoseAnalysisRequest,
        api::models::analysis::GlucoseAnalysisResponse,
        api::models::analysis::HrvAnalysisRequest,
        api::models::analysis::HrvAnalysisResponse,
    )),
    tags(
        (name = "analysis", description = "Biosignal interpretation. Every response carries one endpoint-specific key holding either the interpretation or a short localized failure message."),
        (name = "health", description = "Service liveness"),
    ),
    info(
        title = "vitalsd API",
        description = "Interprets ECG, heart-rate, glucose and HRV series with a text-generation provider.",
    )
)]
pub struct ApiDoc;
