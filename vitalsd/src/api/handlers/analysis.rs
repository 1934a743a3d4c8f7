//! HTTP handlers for the biosignal interpretation endpoints.
//!
//! All four endpoints share one flow: credential check, body parse, then the analysis pipeline.
//! They differ only in the [`SignalKind`] they pass and the key their answer is written under.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::Value;

use crate::{
    AppState,
    analysis::{SignalKind, pipeline},
    api::models::analysis::{
        EcgAnalysisRequest, EcgAnalysisResponse, GlucoseAnalysisRequest, GlucoseAnalysisResponse, HeartAnalysisRequest,
        HeartAnalysisResponse, HrvAnalysisRequest, HrvAnalysisResponse,
    },
    errors::{AnalysisFailure, Error},
};

type Body = Result<Json<Value>, JsonRejection>;

/// Run one request for `kind`, binding any failure to the endpoint.
async fn interpret(state: &AppState, kind: SignalKind, body: Body) -> Result<String, AnalysisFailure> {
    let fail = |error: Error| AnalysisFailure {
        kind,
        error,
        locale: state.config.locale,
        expose_details: state.config.expose_error_details,
    };

    // Without a credential the body is never looked at
    let provider = state.provider.as_deref().ok_or_else(|| fail(Error::MissingCredential))?;
    let Json(body) = body.map_err(|rejection| fail(Error::validation("body", rejection.body_text())))?;

    let result = pipeline::analyze(provider, kind, &body).await.map_err(fail)?;
    Ok(result.interpretation)
}

#[utoipa::path(
    post,
    path = "/analyze",
    tag = "analysis",
    summary = "Interpret an ECG trace",
    description = "Summarizes the voltage series and returns a short interpretation of waves, rhythm and anomalies.",
    request_body = EcgAnalysisRequest,
    responses(
        (status = 200, description = "Interpretation generated", body = EcgAnalysisResponse),
        (status = 400, description = "Voltages missing, empty or not numeric", body = EcgAnalysisResponse),
        (status = 401, description = "No provider credential configured on the server", body = EcgAnalysisResponse),
        (status = 500, description = "Provider unreachable or returned an unexpected reply", body = EcgAnalysisResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn analyze_ecg(State(state): State<AppState>, body: Body) -> Result<Json<EcgAnalysisResponse>, AnalysisFailure> {
    let comment = interpret(&state, SignalKind::Ecg, body).await?;
    Ok(Json(EcgAnalysisResponse { comment }))
}

#[utoipa::path(
    post,
    path = "/analyze_heart",
    tag = "analysis",
    summary = "Interpret heart-rate measurements",
    description = "Filters missing readings, summarizes the series and returns an assessment of level, variability and possible brady/tachycardia.",
    request_body = HeartAnalysisRequest,
    responses(
        (status = 200, description = "Interpretation generated", body = HeartAnalysisResponse),
        (status = 400, description = "Series missing, empty, or without a single valid reading", body = HeartAnalysisResponse),
        (status = 401, description = "No provider credential configured on the server", body = HeartAnalysisResponse),
        (status = 500, description = "Provider unreachable or returned an unexpected reply", body = HeartAnalysisResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn analyze_heart(State(state): State<AppState>, body: Body) -> Result<Json<HeartAnalysisResponse>, AnalysisFailure> {
    let heart_interpretation = interpret(&state, SignalKind::HeartRate, body).await?;
    Ok(Json(HeartAnalysisResponse { heart_interpretation }))
}

#[utoipa::path(
    post,
    path = "/analyze_glucose",
    tag = "analysis",
    summary = "Interpret glucose readings",
    description = "Resolves per-client field names, summarizes the readings and flags hypo/hyperglycemia.",
    request_body = GlucoseAnalysisRequest,
    responses(
        (status = 200, description = "Interpretation generated", body = GlucoseAnalysisResponse),
        (status = 400, description = "Readings missing, empty, or without a single valid value", body = GlucoseAnalysisResponse),
        (status = 401, description = "No provider credential configured on the server", body = GlucoseAnalysisResponse),
        (status = 500, description = "Provider unreachable or returned an unexpected reply", body = GlucoseAnalysisResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn analyze_glucose(State(state): State<AppState>, body: Body) -> Result<Json<GlucoseAnalysisResponse>, AnalysisFailure> {
    let interpretation = interpret(&state, SignalKind::Glucose, body).await?;
    Ok(Json(GlucoseAnalysisResponse { interpretation }))
}

#[utoipa::path(
    post,
    path = "/analyze_hrv_rr",
    tag = "analysis",
    summary = "Interpret heart-rate variability",
    description = "Computes SDNN and RMSSD when not supplied and returns a recovery and stress assessment.",
    request_body = HrvAnalysisRequest,
    responses(
        (status = 200, description = "Interpretation generated", body = HrvAnalysisResponse),
        (status = 400, description = "Intervals missing, empty, or without a single valid value", body = HrvAnalysisResponse),
        (status = 401, description = "No provider credential configured on the server", body = HrvAnalysisResponse),
        (status = 500, description = "Provider unreachable or returned an unexpected reply", body = HrvAnalysisResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn analyze_hrv(State(state): State<AppState>, body: Body) -> Result<Json<HrvAnalysisResponse>, AnalysisFailure> {
    let hrv_interpretation = interpret(&state, SignalKind::Hrv, body).await?;
    Ok(Json(HrvAnalysisResponse { hrv_interpretation }))
}
