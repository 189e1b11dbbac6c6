use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;

use crate::error::{InputError, ReportError};

const GENERIC_FAILURE: &str = "An unexpected error occurred while processing the request.";

/// Error returned by every handler, rendered as `{"error": code, "message": text}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Internal failure; the detail is always logged but only returned when `debug` is set.
    pub fn internal(code: &'static str, detail: impl Display, debug: bool) -> Self {
        error!("{}: {}", code, detail);
        let message = if debug {
            detail.to_string()
        } else {
            GENERIC_FAILURE.to_owned()
        };
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }

    /// Maps a pipeline error onto its HTTP status.
    pub fn from_report(err: ReportError, debug: bool) -> Self {
        match err {
            ReportError::Input(InputError::Missing(path)) => {
                error!("CSV file not found: {}", path.display());
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Self::new(
                    StatusCode::NOT_FOUND,
                    "InputNotFound",
                    format!(
                        "Sales data file not found. Please ensure {} exists in the data directory.",
                        name
                    ),
                )
            }
            ReportError::Input(input) => {
                error!("Invalid sales data: {}", input);
                Self::new(StatusCode::BAD_REQUEST, "InvalidInput", input.to_string())
            }
            ReportError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "ReportNotFound", "Report file not found.")
            }
            err @ ReportError::Render(_) => Self::internal("RenderError", err, debug),
            err @ ReportError::Storage { .. } => Self::internal("StorageError", err, debug),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
