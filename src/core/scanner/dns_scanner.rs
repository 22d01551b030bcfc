// src/core/scanner/dns_scanner.rs

use tracing::{debug, info, warn};

use crate::config::DnsSettings;
use crate::core::errors::ScanError;
use crate::core::models::{DnsProfile, ScanResult};
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;

/// Runs the DNS inspection of the specified domain.
///
/// The NS lookup is mandatory: if it fails the whole scan fails. MX, TXT and
/// DNSKEY lookups are best-effort and run concurrently once the nameservers
/// are known. The open-resolver check only ever targets the first nameserver.
///
/// # Arguments
/// * `target` - The domain name to be inspected.
/// * `settings` - Upstream resolver and the open-resolver check parameters.
pub async fn run_dns_scan(target: &str, settings: &DnsSettings) -> ScanResult<DnsProfile> {
    info!(target, "Starting DNS scan.");

    let resolver = build_resolver(settings);

    let nameservers = lookup_nameservers(&resolver, target).await?;

    let (mx_records, txt_records, dnssec_enabled, open_resolver) = tokio::join!(
        lookup_mx(&resolver, target),
        lookup_txt(&resolver, target),
        check_dnssec(&resolver, target),
        check_open_resolver(&resolver, &nameservers, settings)
    );

    info!(
        nameservers = %nameservers.len(),
        mx = %mx_records.len(),
        txt = %txt_records.len(),
        dnssec_enabled,
        open_resolver,
        "DNS scan finished."
    );

    Ok(DnsProfile {
        nameservers,
        mx_records,
        txt_records,
        dnssec_enabled,
        open_resolver,
    })
}

/// The configured upstream if there is one, otherwise the host's resolv.conf.
fn build_resolver(settings: &DnsSettings) -> TokioAsyncResolver {
    if let Some(upstream) = settings.upstream {
        debug!(%upstream, "Using configured DNS upstream.");
        let group = NameServerConfigGroup::from_ips_clear(&[upstream.ip()], upstream.port(), true);
        return TokioAsyncResolver::tokio(
            ResolverConfig::from_parts(None, vec![], group),
            ResolverOpts::default(),
        );
    }

    TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
        warn!(error = %e, "Could not read the system resolver configuration, using the default upstream.");
        TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
    })
}

/// Resolves the NS records of the domain. Failure here is fatal for the scan.
async fn lookup_nameservers(resolver: &TokioAsyncResolver, target: &str) -> ScanResult<Vec<String>> {
    debug!(target, "Looking up NS records.");
    match resolver.ns_lookup(target).await {
        Ok(lookup) => {
            let records: Vec<String> = lookup.iter().map(|ns| ns.to_string()).collect();
            if records.is_empty() {
                warn!(target, "NS lookup returned no records.");
                return Err(ScanError::Network(format!("No NS records found for {target}")));
            }
            debug!(count = %records.len(), "NS records found.");
            Ok(records)
        }
        Err(e) => {
            warn!(target, error = %e, "NS lookup failed.");
            Err(ScanError::Network(e.to_string()))
        }
    }
}

/// Looks up MX records, rendered as `"<preference> <exchange>"`.
async fn lookup_mx(resolver: &TokioAsyncResolver, target: &str) -> Vec<String> {
    debug!(target, "Looking up MX records.");
    match resolver.mx_lookup(target).await {
        Ok(lookup) => lookup
            .iter()
            .map(|mx| format!("{} {}", mx.preference(), mx.exchange()))
            .collect(),
        Err(e) => {
            // Domains without mail are common; this is not a scan failure.
            debug!(target, error = %e, "MX lookup failed, reporting no records.");
            Vec::new()
        }
    }
}

async fn lookup_txt(resolver: &TokioAsyncResolver, target: &str) -> Vec<String> {
    debug!(target, "Looking up TXT records.");
    match resolver.txt_lookup(target).await {
        Ok(lookup) => lookup.iter().map(|txt| txt.to_string()).collect(),
        Err(e) => {
            debug!(target, error = %e, "TXT lookup failed, reporting no records.");
            Vec::new()
        }
    }
}

/// A zone is considered signed when it publishes at least one DNSKEY record.
async fn check_dnssec(resolver: &TokioAsyncResolver, target: &str) -> bool {
    debug!(target, "Looking up DNSKEY records.");
    match resolver.lookup(target, RecordType::DNSKEY).await {
        Ok(lookup) => lookup.iter().next().is_some(),
        Err(e) => {
            debug!(target, error = %e, "DNSKEY lookup failed, treating zone as unsigned.");
            false
        }
    }
}

/// Asks the first nameserver to resolve a name it is not authoritative for.
///
/// An answer means the server recursed for an arbitrary client. Any failure,
/// including failure to resolve the nameserver's own address, counts as
/// "not open". An empty list short-circuits without touching the network.
pub async fn check_open_resolver(
    resolver: &TokioAsyncResolver,
    nameservers: &[String],
    settings: &DnsSettings,
) -> bool {
    let Some(nameserver) = nameservers.first() else {
        debug!("No nameservers to check for open recursion.");
        return false;
    };

    let address = match resolver.lookup_ip(nameserver.as_str()).await {
        Ok(lookup) => match lookup.iter().next() {
            Some(ip) => ip,
            None => return false,
        },
        Err(e) => {
            warn!(nameserver = %nameserver, error = %e, "Could not resolve nameserver address.");
            return false;
        }
    };

    let mut opts = ResolverOpts::default();
    opts.timeout = settings.recursion_timeout;
    opts.attempts = 1;
    opts.cache_size = 0;
    opts.recursion_desired = true;

    let group = NameServerConfigGroup::from_ips_clear(&[address], settings.nameserver_port, true);
    let direct = TokioAsyncResolver::tokio(ResolverConfig::from_parts(None, vec![], group), opts);

    debug!(
        nameserver = %nameserver,
        %address,
        port = settings.nameserver_port,
        name = %settings.recursion_check_name,
        "Asking nameserver to recurse."
    );
    let answered = match tokio::time::timeout(
        settings.recursion_timeout * 2,
        direct.ipv4_lookup(settings.recursion_check_name.as_str()),
    )
    .await
    {
        Ok(Ok(lookup)) => lookup.iter().next().is_some(),
        Ok(Err(e)) => {
            debug!(nameserver = %nameserver, error = %e, "Nameserver refused or failed the recursive query.");
            false
        }
        Err(_) => false,
    };

    if answered {
        warn!(nameserver = %nameserver, "Nameserver answers recursive queries for arbitrary names.");
    }
    answered
}
