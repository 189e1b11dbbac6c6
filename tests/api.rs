use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{TimeZone, Utc};
use sales_report::api::router;
use sales_report::clock::FixedClock;
use sales_report::{ReportService, Settings};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const SAMPLE_CSV: &str = "producto,cantidad,precio\nLaptop,5,1200.00\nMouse,10,25.50\n";

fn settings_in(root: &Path) -> Settings {
    Settings {
        data_dir: root.join("data"),
        reports_dir: root.join("reports"),
        fonts_dir: std::env::var("FONTS_DIR").ok().map(PathBuf::from),
        ..Settings::default()
    }
}

fn write_input(root: &Path, contents: &str) {
    let data = root.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("ventas.csv"), contents).unwrap();
}

fn app(root: &Path) -> (Router, ReportService) {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    let service = ReportService::with_clock(settings_in(root), Arc::new(clock));
    (router(service.clone()), service)
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn root_and_health_respond() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(dir.path());

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Sales Report API is running");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn list_is_empty_before_any_generation() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(dir.path());

    let response = get(&app, "/api/v1/reports/list").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["reports"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn download_of_unknown_report_is_not_found() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("secret.pdf"), b"secret").unwrap();
    let (app, _) = app(dir.path());

    for uri in [
        "/api/v1/reports/download/missing.pdf",
        "/api/v1/reports/download/..%2Fsecret.pdf",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body_json(response).await["error"], "ReportNotFound");
    }
}

#[tokio::test]
async fn generate_without_input_is_not_found() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(dir.path());

    let response = get(&app, "/api/v1/reports/generate").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "InputNotFound");
    assert!(body["message"].as_str().unwrap().contains("ventas.csv"));
}

#[tokio::test]
async fn generate_with_unknown_columns_is_bad_request() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "name,amount\nLaptop,5\n");
    let (app, _) = app(dir.path());

    let response = get(&app, "/api/v1/reports/generate").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "InvalidInput");
    assert!(!dir.path().join("reports").exists());
}

#[tokio::test]
async fn generate_then_download_and_list() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), SAMPLE_CSV);
    let (app, service) = app(dir.path());
    if !service.renderer().fonts_available() {
        eprintln!("Skipping generate_then_download_and_list: fonts missing. Set FONTS_DIR.");
        return;
    }

    let response = get(&app, "/api/v1/reports/generate").await;
    assert_eq!(response.status(), StatusCode::OK);
    let metadata = body_json(response).await;
    assert_eq!(metadata["filename"], "sales_report_20240115_103000.pdf");
    assert_eq!(metadata["items_count"], 2);
    assert_eq!(metadata["units_sold"], 15);
    assert_eq!(metadata["total_revenue"].as_f64(), Some(6255.0));
    assert_eq!(
        metadata["download_url"],
        "/api/v1/reports/download/sales_report_20240115_103000.pdf"
    );

    let response = get(&app, metadata["download_url"].as_str().unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("sales_report_20240115_103000.pdf"));
    let downloaded = body_bytes(response).await;
    let stored = fs::read(
        dir.path()
            .join("reports")
            .join("sales_report_20240115_103000.pdf"),
    )
    .unwrap();
    assert_eq!(downloaded, stored);

    let response = get(&app, "/api/v1/reports/list").await;
    let listing = body_json(response).await;
    let reports = listing["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["filename"], "sales_report_20240115_103000.pdf");
    assert_eq!(reports[0]["size"].as_u64(), Some(stored.len() as u64));
}

#[tokio::test]
async fn header_only_input_produces_an_empty_report() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), "producto,cantidad,precio\n");
    let (app, service) = app(dir.path());
    if !service.renderer().fonts_available() {
        eprintln!("Skipping header_only_input_produces_an_empty_report: fonts missing. Set FONTS_DIR.");
        return;
    }

    let response = get(&app, "/api/v1/reports/generate").await;
    assert_eq!(response.status(), StatusCode::OK);
    let metadata = body_json(response).await;
    assert_eq!(metadata["items_count"], 0);
    assert_eq!(metadata["units_sold"], 0);
    assert_eq!(metadata["total_revenue"].as_f64(), Some(0.0));

    let response = get(&app, metadata["download_url"].as_str().unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let document = lopdf::Document::load_mem(&body_bytes(response).await).expect("parse report");
    assert!(!document.get_pages().is_empty());
}

#[test]
fn generations_at_distinct_instants_are_all_kept() {
    let dir = TempDir::new().unwrap();
    write_input(dir.path(), SAMPLE_CSV);

    for second in 0..3 {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, second).unwrap());
        let service = ReportService::with_clock(settings_in(dir.path()), Arc::new(clock));
        if !service.renderer().fonts_available() {
            eprintln!("Skipping generations_at_distinct_instants_are_all_kept: fonts missing.");
            return;
        }
        service.generate().unwrap();
    }

    let service = ReportService::new(settings_in(dir.path()));
    let names: Vec<_> = service
        .list()
        .unwrap()
        .into_iter()
        .map(|report| report.filename)
        .collect();
    assert_eq!(
        names,
        vec![
            "sales_report_20240115_103000.pdf",
            "sales_report_20240115_103001.pdf",
            "sales_report_20240115_103002.pdf",
        ]
    );
}
