// src/config.rs

use std::net::SocketAddr;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};

const ENV_PREFIX: &str = "RECON_API_";

/// Executables for each external tool, resolved through `PATH` unless absolute.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub sublist3r: String,
    pub nmap: String,
    pub ffuf: String,
    pub hakrawler: String,
}

/// Per-tool wall-clock budgets.
#[derive(Debug, Clone)]
pub struct Timeouts {
    pub subdomains: Duration,
    pub portscan: Duration,
    pub fuzz: Duration,
    pub crawl: Duration,
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DnsSettings {
    /// Resolver used for every lookup; `None` means the host's system configuration.
    pub upstream: Option<SocketAddr>,
    /// Name resolved through a nameserver to decide whether it recurses for anyone.
    pub recursion_check_name: String,
    pub recursion_timeout: Duration,
    /// Port the open-resolver check sends its query to.
    pub nameserver_port: u16,
}

/// Everything a request handler needs to know, built once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub tools: ToolPaths,
    pub timeouts: Timeouts,
    pub http: HttpSettings,
    pub dns: DnsSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            tools: ToolPaths {
                sublist3r: "sublist3r".to_string(),
                nmap: "nmap".to_string(),
                ffuf: "ffuf".to_string(),
                hakrawler: "hakrawler".to_string(),
            },
            timeouts: Timeouts {
                subdomains: Duration::from_secs(120),
                portscan: Duration::from_secs(30),
                fuzz: Duration::from_secs(60),
                crawl: Duration::from_secs(60),
            },
            http: HttpSettings {
                user_agent: "Mozilla/5.0".to_string(),
                timeout: Duration::from_secs(10),
            },
            dns: DnsSettings {
                upstream: None,
                recursion_check_name: "google.com.".to_string(),
                recursion_timeout: Duration::from_secs(3),
                nameserver_port: 53,
            },
        }
    }
}

impl AppConfig {
    /// Builds the configuration from the defaults and the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Keys are looked up with the `RECON_API_` prefix.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(bind) = get("BIND") {
            config.bind = bind
                .parse()
                .wrap_err_with(|| format!("Invalid {ENV_PREFIX}BIND: {bind}"))?;
        }

        if let Some(path) = get("SUBLIST3R_BIN") {
            config.tools.sublist3r = path;
        }
        if let Some(path) = get("NMAP_BIN") {
            config.tools.nmap = path;
        }
        if let Some(path) = get("FFUF_BIN") {
            config.tools.ffuf = path;
        }
        if let Some(path) = get("HAKRAWLER_BIN") {
            config.tools.hakrawler = path;
        }

        let seconds = |name: &str, current: Duration| -> Result<Duration> {
            match get(name) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .wrap_err_with(|| format!("Invalid {ENV_PREFIX}{name}: {raw}")),
                None => Ok(current),
            }
        };

        config.timeouts.subdomains = seconds("SUBDOMAIN_TIMEOUT", config.timeouts.subdomains)?;
        config.timeouts.portscan = seconds("PORTSCAN_TIMEOUT", config.timeouts.portscan)?;
        config.timeouts.fuzz = seconds("FUZZ_TIMEOUT", config.timeouts.fuzz)?;
        config.timeouts.crawl = seconds("CRAWL_TIMEOUT", config.timeouts.crawl)?;
        config.http.timeout = seconds("HTTP_TIMEOUT", config.http.timeout)?;
        config.dns.recursion_timeout = seconds("RECURSION_TIMEOUT", config.dns.recursion_timeout)?;

        if let Some(agent) = get("USER_AGENT") {
            config.http.user_agent = agent;
        }
        if let Some(name) = get("RECURSION_CHECK_NAME") {
            config.dns.recursion_check_name = name;
        }
        if let Some(upstream) = get("DNS_UPSTREAM") {
            let address = upstream
                .parse()
                .wrap_err_with(|| format!("Invalid {ENV_PREFIX}DNS_UPSTREAM: {upstream}"))?;
            config.dns.upstream = Some(address);
        }
        if let Some(port) = get("NAMESERVER_PORT") {
            config.dns.nameserver_port = port
                .trim()
                .parse()
                .wrap_err_with(|| format!("Invalid {ENV_PREFIX}NAMESERVER_PORT: {port}"))?;
        }

        Ok(config)
    }
}
