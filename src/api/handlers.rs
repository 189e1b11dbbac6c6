use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::task;

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::model::{ReportMetadata, StoredReport};

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Serialize)]
pub struct ReportList {
    pub reports: Vec<StoredReport>,
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "Sales Report API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/",
        "endpoints": [
            "/health",
            "/api/v1/reports/generate",
            "/api/v1/reports/list",
            "/api/v1/reports/download/{filename}",
        ],
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "sales-report-api" }))
}

/// Runs the pipeline on the configured CSV and returns the stored report's metadata.
pub async fn generate_report(
    State(state): State<AppState>,
) -> Result<Json<ReportMetadata>, ApiError> {
    let debug = state.debug();
    let service = state.service;

    let report = task::spawn_blocking(move || service.generate())
        .await
        .map_err(|err| ApiError::internal("GenerationFailed", err, debug))?
        .map_err(|err| ApiError::from_report(err, debug))?;

    Ok(Json(report.metadata()))
}

pub async fn list_reports(State(state): State<AppState>) -> Result<Json<ReportList>, ApiError> {
    let debug = state.debug();
    let service = state.service;

    let reports = task::spawn_blocking(move || service.list())
        .await
        .map_err(|err| ApiError::internal("ListFailed", err, debug))?
        .map_err(|err| ApiError::from_report(err, debug))?;

    Ok(Json(ReportList { reports }))
}

pub async fn download_report(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let debug = state.debug();
    let service = state.service;

    let name = filename.clone();
    let bytes = task::spawn_blocking(move || service.load(&name))
        .await
        .map_err(|err| ApiError::internal("DownloadFailed", err, debug))?
        .map_err(|err| ApiError::from_report(err, debug))?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        filename.replace('"', "_")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
