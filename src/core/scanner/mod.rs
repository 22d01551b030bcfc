// src/core/scanner/mod.rs

// This file acts as the public interface for the `scanner` module.
// Tool-backed scanners go through `core::runner`; the DNS and fingerprint
// scanners talk to the network directly.
pub mod crawl_scanner;
pub mod dns_scanner;
pub mod fingerprint_scanner;
pub mod fuzz_scanner;
pub mod port_scanner;
pub mod subdomain_scanner;
#[cfg(test)]
pub(crate) mod zone_server;

pub use self::crawl_scanner::run_crawl_scan;
pub use self::dns_scanner::run_dns_scan;
pub use self::fingerprint_scanner::run_fingerprint_scan;
pub use self::fuzz_scanner::run_fuzz_scan;
pub use self::port_scanner::run_port_scan;
pub use self::subdomain_scanner::run_subdomain_scan;
