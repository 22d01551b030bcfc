// src/core/models.rs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::Display;
use url::Url;

use crate::core::errors::ScanError;

/// The external tools this service drives.
///
/// `Display` yields the label used in user-facing messages ("Nmap scan timed out").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Tool {
    #[strum(to_string = "Sublist3r")]
    Sublist3r,
    #[strum(to_string = "Nmap")]
    Nmap,
    #[strum(to_string = "FFUF")]
    Ffuf,
    #[strum(to_string = "Hakrawler")]
    Hakrawler,
}

// --- Reusable Result Types ---

// Every scan either yields its payload or a `ScanError` that the router renders as `{ "error": ... }`.
pub type ScanResult<T> = Result<T, ScanError>;

// --- Request Models ---

/// The JSON body accepted by every endpoint.
///
/// Fields are optional at the parsing stage so that a missing key can be
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanRequest {
    pub domain: Option<String>,
    pub wordlist: Option<String>,
}

impl ScanRequest {
    /// Parses a raw request body. An empty or malformed body yields an empty request.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// The target domain, trimmed.
    ///
    /// A full URL is accepted and reduced to its host (and port, if any).
    /// Values an external tool could read as an option or as more than one
    /// argument are rejected.
    pub fn domain(&self) -> Result<String, ScanError> {
        let raw = self
            .domain
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| ScanError::missing("domain"))?;

        let domain = if raw.contains("://") {
            Url::parse(raw)
                .ok()
                .and_then(|url| {
                    url.host_str().map(|host| match url.port() {
                        Some(port) => format!("{host}:{port}"),
                        None => host.to_string(),
                    })
                })
                .ok_or_else(|| ScanError::Validation(format!("Invalid domain: {raw}")))?
        } else {
            raw.to_string()
        };

        if domain.starts_with('-') || domain.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ScanError::Validation(format!("Invalid domain: {domain}")));
        }
        Ok(domain)
    }

    pub fn wordlist(&self) -> Result<&str, ScanError> {
        self.wordlist
            .as_deref()
            .filter(|w| !w.trim().is_empty())
            .ok_or_else(|| ScanError::missing("wordlist"))
    }
}

// --- Tool Output Models ---

// Raw text output of a tool that is returned as-is (port scan, fuzzing).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolOutput {
    pub output: String,
}

// The URLs discovered by the crawler, one per line of its output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrawlResult {
    pub urls: Vec<String>,
}

// --- Fingerprint Models ---

/// The technology stack guessed from a single page fetch.
///
/// `javascript`, `css` and `analytics` serialize as `null` when no signature matched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TechProfile {
    pub server: String,
    pub javascript: Option<BTreeSet<String>>,
    pub css: Option<BTreeSet<String>>,
    pub analytics: Option<BTreeSet<String>>,
}

// --- DNS Models ---

/// Aggregated result of the DNS inspection of a domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DnsProfile {
    #[serde(rename = "dnsServers")]
    pub nameservers: Vec<String>,
    pub mx_records: Vec<String>,
    pub txt_records: Vec<String>,
    pub dnssec_enabled: bool,
    pub open_resolver: bool,
}
