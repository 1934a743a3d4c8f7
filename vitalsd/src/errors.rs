use crate::analysis::SignalKind;
use crate::config::Locale;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use thiserror::Error as ThisError;

/// Every way an analysis request can fail.
///
/// Stage-local failures are raised as one of these variants and classified into an HTTP status and
/// a short localized sentence at the request boundary; nothing reaches the client unclassified.
#[derive(ThisError, Debug)]
pub enum Error {
    /// No provider credential configured
    #[error("Provider credential is not configured")]
    MissingCredential,

    /// Request body or required series failed shape checks
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Every sample was filtered out as a missing/invalid reading
    #[error("No valid {kind} samples left after filtering")]
    NoValidData { kind: SignalKind },

    /// Network, timeout, HTTP status or payload failure talking to the provider
    #[error("Provider request failed: {message}")]
    Provider { message: String },

    /// Provider answered, but not in the shape its adapter expects
    #[error("Unexpected {provider} response shape: {message}")]
    UnexpectedProviderShape { provider: &'static str, message: String },
}

impl Error {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingCredential => StatusCode::UNAUTHORIZED,
            Error::Validation { .. } | Error::NoValidData { .. } => StatusCode::BAD_REQUEST,
            Error::Provider { .. } | Error::UnexpectedProviderShape { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self, kind: SignalKind, locale: Locale) -> String {
        match (self, locale) {
            (Error::MissingCredential, Locale::Tr) => "Sunucuda API anahtarı tanımlı değil, yorum yapılamıyor.".to_string(),
            (Error::MissingCredential, Locale::En) => "No API key is configured on the server; interpretation is unavailable.".to_string(),
            (Error::Validation { .. }, Locale::Tr) => format!("{} verisi eksik veya geçersiz.", kind.signal_label(locale)),
            (Error::Validation { .. }, Locale::En) => format!("{} data is missing or invalid.", kind.signal_label(locale)),
            (Error::NoValidData { .. }, Locale::Tr) => "Yorumlanacak geçerli veri bulunamadı.".to_string(),
            (Error::NoValidData { .. }, Locale::En) => "There is no valid data to interpret.".to_string(),
            (Error::Provider { .. } | Error::UnexpectedProviderShape { .. }, Locale::Tr) => "Yorum alınamadı.".to_string(),
            (Error::Provider { .. } | Error::UnexpectedProviderShape { .. }, Locale::En) => {
                "The interpretation could not be retrieved.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("request timed out: {e}")
        } else if e.is_connect() {
            format!("could not connect: {e}")
        } else {
            e.to_string()
        };
        Error::Provider { message }
    }
}

/// An [`Error`] bound to the endpoint it happened on.
///
/// Every endpoint answers with its own text key (`comment`, `heart_interpretation`, ...), failures
/// included, so the kind travels with the error up to the response.
#[derive(Debug)]
pub struct AnalysisFailure {
    pub kind: SignalKind,
    pub error: Error,
    pub locale: Locale,
    pub expose_details: bool,
}

impl AnalysisFailure {
    pub fn message(&self) -> String {
        let message = self.error.user_message(self.kind, self.locale);
        if self.expose_details && self.error.status_code().is_server_error() {
            format!("{message} ({})", self.error)
        } else {
            message
        }
    }
}

impl IntoResponse for AnalysisFailure {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self.error {
            Error::Provider { .. } | Error::UnexpectedProviderShape { .. } => {
                tracing::error!(kind = %self.kind, "Interpretation failed: {:#}", self.error);
            }
            Error::MissingCredential => {
                tracing::info!(kind = %self.kind, "Rejected request: {}", self.error);
            }
            Error::Validation { .. } | Error::NoValidData { .. } => {
                tracing::debug!(kind = %self.kind, "Client error: {}", self.error);
            }
        }

        let status = self.error.status_code();
        let mut body = Map::new();
        body.insert(self.kind.response_key().to_string(), Value::String(self.message()));

        (status, Json(Value::Object(body))).into_response()
    }
}

/// Type alias for pipeline results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(kind: SignalKind, error: Error) -> AnalysisFailure {
        AnalysisFailure {
            kind,
            error,
            locale: Locale::Tr,
            expose_details: false,
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::MissingCredential.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::validation("voltages", "missing").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::NoValidData { kind: SignalKind::Glucose }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Provider { message: "boom".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::UnexpectedProviderShape {
                provider: "huggingface",
                message: "not a list".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_message_names_the_signal() {
        let error = Error::validation("bpm_values", "missing");
        assert_eq!(
            error.user_message(SignalKind::HeartRate, Locale::Tr),
            "Nabız (BPM) verisi eksik veya geçersiz."
        );
        assert_eq!(
            error.user_message(SignalKind::HeartRate, Locale::En),
            "Heart rate (BPM) data is missing or invalid."
        );
    }

    #[test]
    fn test_provider_detail_is_hidden_by_default() {
        let f = failure(
            SignalKind::Ecg,
            Error::Provider {
                message: "upstream returned 529 overloaded".into(),
            },
        );
        assert_eq!(f.message(), "Yorum alınamadı.");
    }

    #[test]
    fn test_provider_detail_exposed_in_debug_mode() {
        let mut f = failure(
            SignalKind::Ecg,
            Error::Provider {
                message: "upstream returned 529 overloaded".into(),
            },
        );
        f.expose_details = true;
        let message = f.message();
        assert!(message.starts_with("Yorum alınamadı."));
        assert!(message.contains("529 overloaded"));
    }

    #[test]
    fn test_client_errors_never_carry_detail() {
        let mut f = failure(SignalKind::Hrv, Error::validation("rr_intervals", "element 3 is not a number"));
        f.expose_details = true;
        assert_eq!(f.message(), "RR aralığı verisi eksik veya geçersiz.");
    }
}
