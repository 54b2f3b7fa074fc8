//! Advertise-host selection and `host:port` joining.

use std::net::IpAddr;

/// Returns `true` for bind addresses that listen on every interface.
#[must_use]
pub fn is_wildcard(host: &str) -> bool {
    matches!(host, "" | "0.0.0.0" | "::" | "[::]")
}

/// Map a bind address to a host other processes can connect to.
///
/// A wildcard bind address becomes the first non-loopback IPv4 address in
/// `candidates`, or `localhost` when there is none. Any other address is
/// already connectable and is returned as-is.
#[must_use]
pub fn advertise_host(listen: &str, candidates: &[IpAddr]) -> String {
    if !is_wildcard(listen) {
        return listen.to_string();
    }
    candidates
        .iter()
        .find(|ip| ip.is_ipv4() && !ip.is_loopback())
        .map_or_else(|| "localhost".to_string(), ToString::to_string)
}

/// Join a host and port, bracketing IPv6 literals.
#[must_use]
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
