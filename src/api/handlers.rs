// src/api/handlers.rs

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::{ApiError, AppState};
use crate::core::models::{ScanRequest, ScanResult};
use crate::core::scanner::{
    run_crawl_scan, run_dns_scan, run_fingerprint_scan, run_fuzz_scan, run_port_scan,
    run_subdomain_scan,
};

/// Renders a scan outcome. Scan failures are still a 200 with an `error` field;
/// only validation problems change the status code.
fn scan_response<T: Serialize>(result: ScanResult<T>) -> Response {
    match result {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(e) if e.is_validation() => ApiError::from(e).into_response(),
        Err(e) => {
            warn!(tool = ?e.tool(), error = %e, "Scan failed.");
            (StatusCode::OK, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}

pub async fn subdomains_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = ScanRequest::from_body(&body);
    let domain = request.domain()?;
    info!(endpoint = "subdomains", %domain, "Scan requested.");

    let subdomains = run_subdomain_scan(&domain, &state.config).await;
    Ok(Json(subdomains).into_response())
}

pub async fn portscan_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = ScanRequest::from_body(&body);
    let domain = request.domain()?;
    info!(endpoint = "portscan", %domain, "Scan requested.");

    Ok(scan_response(run_port_scan(&domain, &state.config).await))
}

pub async fn fuzz_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = ScanRequest::from_body(&body);
    let domain = request.domain()?;
    let wordlist = request.wordlist()?;
    info!(endpoint = "fuzz", %domain, wordlist, "Scan requested.");

    Ok(scan_response(run_fuzz_scan(&domain, wordlist, &state.config).await))
}

pub async fn crawl_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = ScanRequest::from_body(&body);
    let domain = request.domain()?;
    info!(endpoint = "hakrawler", %domain, "Scan requested.");

    Ok(scan_response(run_crawl_scan(&domain, &state.config).await))
}

pub async fn techdetect_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = ScanRequest::from_body(&body);
    let domain = request.domain()?;
    info!(endpoint = "techdetect", %domain, "Scan requested.");

    Ok(scan_response(run_fingerprint_scan(&domain, &state.config.http).await))
}

pub async fn dns_scan_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = ScanRequest::from_body(&body);
    let domain = request.domain()?;
    info!(endpoint = "dns-scan", %domain, "Scan requested.");

    Ok(scan_response(run_dns_scan(&domain, &state.config.dns).await))
}
