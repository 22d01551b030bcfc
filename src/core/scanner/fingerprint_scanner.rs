// src/core/scanner/fingerprint_scanner.rs

use std::collections::BTreeSet;

use scraper::{Html, Selector};
use tracing::{debug, error, info};

use crate::config::HttpSettings;
use crate::core::errors::ScanError;
use crate::core::models::{ScanResult, TechProfile};

/// A signature table: a lowercase needle and the label reported when it matches.
type Signatures = &'static [(&'static str, &'static str)];

/// Matched against the `Server` response header.
static SERVER_SIGNATURES: Signatures = &[("nginx", "NGINX"), ("apache", "Apache"), ("iis", "IIS")];

/// Matched against the `src` attribute of every `<script>` tag.
static SCRIPT_SIGNATURES: Signatures = &[
    ("jquery", "jQuery"),
    ("react", "React"),
    ("vue", "Vue"),
    ("angular", "Angular"),
];

/// Matched against the `href` of every stylesheet `<link>`.
static STYLESHEET_SIGNATURES: Signatures = &[
    ("bootstrap", "Bootstrap"),
    ("foundation", "Foundation"),
    ("bulma", "Bulma"),
];

/// Matched against the raw page body.
static ANALYTICS_SIGNATURES: Signatures = &[
    ("google-analytics.com/ga.js", "Google Analytics"),
    ("googletagmanager.com/gtm.js", "Google Tag Manager"),
    ("facebook.net", "Facebook Pixel"),
];

/// Fetches `http://{target}` once and guesses its technology stack.
///
/// Any failure to build the client, reach the host or read the body is
/// reported as `ScanError::Network` with the client's message.
pub async fn run_fingerprint_scan(target: &str, settings: &HttpSettings) -> ScanResult<TechProfile> {
    info!(target, "Starting fingerprint scan.");

    let client = reqwest::Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.timeout)
        .build()
        .map_err(|e| {
            error!(error = %e, "Failed to build HTTP client");
            ScanError::Network(e.to_string())
        })?;

    let url = format!("http://{}", target);
    let response = client.get(&url).send().await.map_err(|e| {
        error!(url = %url, error = %e, "HTTP request failed");
        ScanError::Network(e.to_string())
    })?;
    info!(status = %response.status(), "Received HTTP response.");

    let server = response
        .headers()
        .get(reqwest::header::SERVER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let body = response.text().await.map_err(|e| {
        error!(error = %e, "Failed to read response body");
        ScanError::Network(e.to_string())
    })?;
    debug!(bytes = %body.len(), "Successfully read response body.");

    let profile = fingerprint(server.as_deref(), &body);
    info!(server = %profile.server, "Fingerprint scan finished.");
    Ok(profile)
}

/// Derives a `TechProfile` from a `Server` header value and a page body.
///
/// The body is parsed exactly once; every field comes from that parse.
pub fn fingerprint(server_header: Option<&str>, body: &str) -> TechProfile {
    let document = Html::parse_document(body);

    let script_sources = attribute_values(&document, "script[src]", "src", |_| true);
    let stylesheet_hrefs = attribute_values(&document, "link[href]", "href", |el| {
        el.attr("rel")
            .map(|rel| rel.split_ascii_whitespace().any(|r| r.eq_ignore_ascii_case("stylesheet")))
            .unwrap_or(false)
    });

    TechProfile {
        server: detect_server(server_header),
        javascript: match_all(SCRIPT_SIGNATURES, &script_sources),
        css: match_all(STYLESHEET_SIGNATURES, &stylesheet_hrefs),
        analytics: match_all(ANALYTICS_SIGNATURES, &[body]),
    }
}

/// Maps a `Server` header to a known name, falling back to its raw value.
fn detect_server(header: Option<&str>) -> String {
    let Some(value) = header.filter(|v| !v.is_empty()) else {
        return "Unknown".to_string();
    };
    let lowered = value.to_lowercase();
    SERVER_SIGNATURES
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Collects every label whose needle occurs in any of `haystacks`, ignoring case.
///
/// Returns `None` rather than an empty set when nothing matched.
fn match_all<S: AsRef<str>>(signatures: Signatures, haystacks: &[S]) -> Option<BTreeSet<String>> {
    let mut found = BTreeSet::new();
    for haystack in haystacks {
        let lowered = haystack.as_ref().to_lowercase();
        for (needle, label) in signatures {
            if lowered.contains(needle) {
                debug!(tech = %label, "Signature matched.");
                found.insert(label.to_string());
            }
        }
    }
    (!found.is_empty()).then_some(found)
}

/// Returns the `attr` value of every element matching `selector` that passes `keep`.
fn attribute_values<'a, F>(doc: &'a Html, selector: &str, attr: &str, keep: F) -> Vec<&'a str>
where
    F: Fn(&scraper::node::Element) -> bool,
{
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    doc.select(&selector)
        .map(|el| el.value())
        .filter(|&el| keep(el))
        .filter_map(|el| el.attr(attr))
        .collect()
}
