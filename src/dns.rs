use anyhow::Result;
use hickory_resolver::{AsyncResolver, TokioAsyncResolver};
use std::net::IpAddr;
use std::time::Duration;

/// Build a resolver from the system configuration.
fn get_resolver() -> Result<TokioAsyncResolver> {
    Ok(AsyncResolver::tokio_from_system_conf()?)
}

/// Perform a reverse DNS lookup for the given IP address with a timeout.
///
/// Best-effort: resolver construction failure, lookup failure and timeout
/// all yield `None`.
pub async fn reverse_lookup(ip: IpAddr, timeout: Duration) -> Option<String> {
    let resolver = get_resolver().ok()?;
    match tokio::time::timeout(timeout, resolver.reverse_lookup(ip)).await {
        Ok(Ok(names)) => names
            .iter()
            .next()
            .map(|name| name.to_string().trim_end_matches('.').to_string()),
        _ => None,
    }
}
