// src/core/scanner/port_scanner.rs

use tracing::info;

use crate::config::AppConfig;
use crate::core::models::{ScanResult, Tool, ToolOutput};
use crate::core::runner;

/// Builds the nmap argument vector: no host discovery, aggressive timing, top 100 ports.
pub fn nmap_args(target: &str) -> Vec<String> {
    ["-Pn", "-T4", "-F", target].iter().map(|s| s.to_string()).collect()
}

/// Runs a fast nmap port scan and returns its report verbatim.
pub async fn run_port_scan(target: &str, config: &AppConfig) -> ScanResult<ToolOutput> {
    info!(target, "Starting port scan.");
    let output = runner::run(
        Tool::Nmap,
        &config.tools.nmap,
        &nmap_args(target),
        None,
        config.timeouts.portscan,
    )
    .await?;

    Ok(ToolOutput { output: output.stdout.trim().to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ScanError;

    #[test]
    fn target_is_the_last_argument() {
        assert_eq!(nmap_args("scanme.nmap.org"), vec!["-Pn", "-T4", "-F", "scanme.nmap.org"]);
    }

    #[tokio::test]
    async fn report_is_trimmed() {
        // `echo` stands in for nmap and prints back the arguments it was given.
        let mut config = AppConfig::default();
        config.tools.nmap = "echo".to_string();

        let result = run_port_scan("scanme.nmap.org", &config).await.unwrap();
        assert_eq!(result.output, "-Pn -T4 -F scanme.nmap.org");
    }

    #[tokio::test]
    async fn scanner_failing_silently_is_an_error() {
        let mut config = AppConfig::default();
        config.tools.nmap = "false".to_string();

        let err = run_port_scan("scanme.nmap.org", &config).await.unwrap_err();
        assert_eq!(
            err,
            ScanError::ToolFailure { tool: Tool::Nmap, message: "Nmap exited with status 1".to_string() }
        );
    }
}
