// src/core/scanner/fuzz_scanner.rs

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::errors::ScanError;
use crate::core::models::{ScanResult, Tool, ToolOutput};
use crate::core::runner;

/// Status codes ffuf reports as hits.
const MATCH_CODES: &str = "200,204,301,302,403";

// CSI escape sequences emitted by ffuf's `-c` colour mode and its progress line.
static RE_ANSI: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").unwrap());

/// Builds the ffuf argument vector, with `FUZZ` as the path placeholder.
pub fn ffuf_args(target: &str, wordlist: &str) -> Vec<String> {
    vec![
        "-w".to_string(),
        wordlist.to_string(),
        "-u".to_string(),
        format!("http://{}/FUZZ", target),
        "-mc".to_string(),
        MATCH_CODES.to_string(),
        "-c".to_string(),
    ]
}

/// Fuzzes `http://{target}/FUZZ` with the entries of `wordlist`.
///
/// The wordlist is checked before anything is spawned.
pub async fn run_fuzz_scan(target: &str, wordlist: &str, config: &AppConfig) -> ScanResult<ToolOutput> {
    if !Path::new(wordlist).is_file() {
        warn!(wordlist, "Wordlist does not exist, not starting ffuf.");
        return Err(ScanError::WordlistNotFound(wordlist.to_string()));
    }

    info!(target, wordlist, "Starting fuzz scan.");
    let output = runner::run(
        Tool::Ffuf,
        &config.tools.ffuf,
        &ffuf_args(target, wordlist),
        None,
        config.timeouts.fuzz,
    )
    .await?;

    Ok(ToolOutput { output: strip_ansi(&output.stdout).trim().to_string() })
}

fn strip_ansi(text: &str) -> String {
    RE_ANSI.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_carries_the_fuzz_marker() {
        let args = ffuf_args("example.com", "/usr/share/wordlists/common.txt");
        assert_eq!(
            args,
            vec![
                "-w",
                "/usr/share/wordlists/common.txt",
                "-u",
                "http://example.com/FUZZ",
                "-mc",
                "200,204,301,302,403",
                "-c"
            ]
        );
    }

    #[test]
    fn colour_codes_are_removed() {
        let raw = "\x1b[2K\x1b[32madmin\x1b[0m                   [Status: 301, Size: 0]\n";
        assert_eq!(strip_ansi(raw), "admin                   [Status: 301, Size: 0]\n");
    }

    #[tokio::test]
    async fn missing_wordlist_never_spawns() {
        let mut config = AppConfig::default();
        // Would fail with `Unexpected` if anything were spawned.
        config.tools.ffuf = "/definitely/not/ffuf".to_string();

        let err = run_fuzz_scan("example.com", "/no/such/wordlist.txt", &config)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Wordlist not found: /no/such/wordlist.txt");
    }

    #[tokio::test]
    async fn existing_wordlist_reaches_the_fuzzer() {
        let wordlist = std::env::temp_dir().join(format!("recon-api-words-{}.txt", std::process::id()));
        std::fs::write(&wordlist, "admin\nlogin\n").unwrap();

        let mut config = AppConfig::default();
        config.tools.ffuf = "echo".to_string();

        let path = wordlist.to_string_lossy().into_owned();
        let result = run_fuzz_scan("example.com", &path, &config).await.unwrap();
        assert!(result.output.contains("http://example.com/FUZZ"));
        assert!(result.output.contains(&path));

        let _ = std::fs::remove_file(&wordlist);
    }
}
