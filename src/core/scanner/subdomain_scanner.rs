// src/core/scanner/subdomain_scanner.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::core::errors::ScanError;
use crate::core::models::{ScanResult, Tool};
use crate::core::runner;

/// Worker threads sublist3r uses for its search engines.
const THREADS: u32 = 40;

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Builds the sublist3r argument vector, writing results to `output_file`.
pub fn sublist3r_args(target: &str, output_file: &Path) -> Vec<String> {
    vec![
        "-d".to_string(),
        target.to_string(),
        "-t".to_string(),
        THREADS.to_string(),
        "-o".to_string(),
        output_file.to_string_lossy().into_owned(),
    ]
}

/// Enumerates subdomains of `target`.
///
/// Always yields a list: any failure of the enumerator is logged and
/// reported as "nothing found".
pub async fn run_subdomain_scan(target: &str, config: &AppConfig) -> Vec<String> {
    info!(target, "Starting subdomain enumeration.");
    match enumerate(target, config).await {
        Ok(subdomains) => {
            info!(count = %subdomains.len(), "Subdomain enumeration finished.");
            subdomains
        }
        Err(e) => {
            error!(target, error = %e, "Subdomain enumeration failed, returning no results.");
            Vec::new()
        }
    }
}

async fn enumerate(target: &str, config: &AppConfig) -> ScanResult<Vec<String>> {
    let output_file = scratch_file();
    let result = runner::run(
        Tool::Sublist3r,
        &config.tools.sublist3r,
        &sublist3r_args(target, &output_file),
        None,
        config.timeouts.subdomains,
    )
    .await;

    let contents = match result {
        // sublist3r only creates the file when it found something.
        Ok(_) => match tokio::fs::read_to_string(&output_file).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(ScanError::Unexpected(e.to_string())),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = tokio::fs::remove_file(&output_file).await {
        debug!(path = %output_file.display(), error = %e, "No result file to clean up.");
    }

    Ok(parse_subdomains(&contents?))
}

/// One subdomain per line; blank lines dropped, duplicates removed in first-seen order.
fn parse_subdomains(contents: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_owned)
        .collect()
}

/// A result file path unique to this process and run.
fn scratch_file() -> PathBuf {
    let run = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("recon-api-subdomains-{}-{}.txt", std::process::id(), run))
}
