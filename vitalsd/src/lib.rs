//! # vitalsd: biosignal interpretation service
//!
//! `vitalsd` accepts short biosignal recordings from client apps (ECG voltages, heart-rate series,
//! glucose readings, RR intervals), checks and summarizes them, and asks a text-generation provider
//! for a brief human-readable interpretation. The answer goes back under an endpoint-specific JSON
//! key; failures come back under the same key as a short localized sentence with a matching HTTP
//! status.
//!
//! ## Request Flow
//!
//! Each `POST` handler in [`api::handlers::analysis`] checks that a provider credential is
//! configured, parses the body, and hands it to [`analysis::pipeline::analyze`]:
//!
//! 1. **Validation** ([`analysis::validate`]): the series field must be a non-empty array
//! 2. **Normalization** ([`analysis::normalize`]): glucose fields are resolved across client aliases
//! 3. **Statistics** ([`analysis::stats`]): sentinel readings are dropped and count/average/min/max
//!    (plus SDNN/RMSSD for HRV) are computed, unless the client supplied them
//! 4. **Prompting** ([`analysis::prompt`]): a fixed template per signal, with the raw series cut to
//!    a per-kind bound
//! 5. **Generation** ([`providers`]): one call to the configured backend, bounded by
//!    `request_timeout`, and extraction of the reply text
//!
//! Every failure is a variant of [`errors::Error`]; the handler pairs it with its signal kind so the
//! response lands under the right key.
//!
//! Requests share no mutable state. The only shared values are the [`Config`] and the provider
//! adapter, both built once at startup.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use vitalsd::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = vitalsd::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     vitalsd::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod analysis;
pub mod api;
pub mod config;
pub mod errors;
mod openapi;
pub mod providers;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use crate::config::CorsOrigin;
use crate::openapi::ApiDoc;
use crate::providers::Provider;
use axum::{
    Router,
    http::{self, HeaderValue},
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// - `config`: configuration loaded at startup
/// - `provider`: the configured text-generation backend; `None` when no credential is configured,
///   in which case every analysis request is answered with 401
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .maybe_provider(providers::build_provider(&config))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub provider: Option<Arc<dyn Provider>>,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors = &config.cors;

    let allow_origin = if cors.allowed_origins.contains(&CorsOrigin::Wildcard) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_headers([http::header::CONTENT_TYPE]);

    if let Some(max_age) = cors.max_age {
        layer = layer.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(layer)
}

/// Build the application router with all endpoints and middleware.
///
/// - Analysis routes (`/analyze`, `/analyze_heart`, `/analyze_glucose`, `/analyze_hrv_rr`)
/// - Liveness (`/healthz`) and API docs (`/docs`)
/// - CORS configuration
/// - Optional Prometheus metrics at `/internal/metrics`
/// - Tracing middleware
///
/// # Errors
///
/// Returns an error if the CORS configuration cannot be turned into header values.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let enable_metrics = state.config.enable_metrics;
    let cors_layer = create_cors_layer(&state.config)?;

    let mut router = Router::new()
        .route("/analyze", post(api::handlers::analysis::analyze_ecg))
        .route("/analyze_heart", post(api::handlers::analysis::analyze_heart))
        .route("/analyze_glucose", post(api::handlers::analysis::analyze_glucose))
        .route("/analyze_hrv_rr", post(api::handlers::analysis::analyze_hrv))
        .route("/healthz", get(api::handlers::health::healthz))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer);

    if enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct owning the router and configuration.
///
/// 1. **Create**: [`Application::new`] builds the provider adapter and the router
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests finish and buffered
///    telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!(
            bind = %config.bind_address(),
            locale = ?config.locale,
            timeout = ?config.request_timeout,
            "Starting vitalsd"
        );

        let provider = providers::build_provider(&config);
        match &provider {
            Some(provider) => info!(
                provider = %provider.kind(),
                model = config.provider.model(),
                "Text-generation provider configured"
            ),
            None => warn!("No provider credential configured; analysis endpoints will answer 401"),
        }

        let app_state = AppState::builder().config(config.clone()).maybe_provider(provider).build();
        let router = build_router(app_state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "vitalsd listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
