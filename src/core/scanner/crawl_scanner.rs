// src/core/scanner/crawl_scanner.rs

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::models::{CrawlResult, ScanResult, Tool};
use crate::core::runner;

/// Depth 2, include subdomains, unique URLs only, print the source of each URL.
pub fn hakrawler_args() -> Vec<String> {
    ["-d", "2", "-subs", "-u", "-s"].iter().map(|s| s.to_string()).collect()
}

/// Crawls `https://{target}`; hakrawler reads its seed URLs from stdin.
pub async fn run_crawl_scan(target: &str, config: &AppConfig) -> ScanResult<CrawlResult> {
    let seed = format!("https://{}\n", target);
    info!(target, "Starting crawl.");

    let output = runner::run(
        Tool::Hakrawler,
        &config.tools.hakrawler,
        &hakrawler_args(),
        Some(&seed),
        config.timeouts.crawl,
    )
    .await?;

    if !output.stderr.trim().is_empty() {
        warn!(stderr = %output.stderr.trim(), "Hakrawler wrote to stderr.");
    }

    let urls = parse_urls(&output.stdout);
    info!(count = %urls.len(), "Crawl finished.");
    Ok(CrawlResult { urls })
}

/// One URL per non-blank line of crawler output.
fn parse_urls(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ScanError;

    #[test]
    fn blank_lines_are_dropped() {
        let stdout = "[href] https://example.com/about\n\n  \n[script] https://cdn.example.com/app.js\n";
        assert_eq!(
            parse_urls(stdout),
            vec!["[href] https://example.com/about", "[script] https://cdn.example.com/app.js"]
        );
    }

    #[test]
    fn empty_output_means_no_urls() {
        assert!(parse_urls("").is_empty());
    }

    #[tokio::test]
    async fn crawler_failing_silently_is_an_error() {
        let mut config = AppConfig::default();
        config.tools.hakrawler = "false".to_string();

        let err = run_crawl_scan("example.com", &config).await.unwrap_err();
        assert!(matches!(err, ScanError::ToolFailure { tool: Tool::Hakrawler, .. }));
    }

    #[tokio::test]
    async fn missing_crawler_is_unexpected() {
        let mut config = AppConfig::default();
        config.tools.hakrawler = "/definitely/not/hakrawler".to_string();

        let err = run_crawl_scan("example.com", &config).await.unwrap_err();
        assert!(matches!(err, ScanError::Unexpected(_)));
    }
}
