//! Network infrastructure: implements `HostResolver` from local interfaces.

use std::net::IpAddr;

use crate::application::ports::HostResolver;
use crate::domain::host::{advertise_host, is_wildcard};

/// Production `HostResolver`: wildcard bind addresses advertise the first
/// external IPv4 interface address.
pub struct InterfaceHostResolver;

impl HostResolver for InterfaceHostResolver {
    fn advertise_host(&self, listen: &str) -> String {
        if !is_wildcard(listen) {
            return listen.to_string();
        }
        advertise_host(listen, &interface_addrs())
    }
}

/// Addresses of every local interface, empty if they cannot be listed.
fn interface_addrs() -> Vec<IpAddr> {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces.into_iter().map(|iface| iface.ip()).collect(),
        Err(e) => {
            tracing::debug!(error = %e, "cannot list network interfaces");
            Vec::new()
        }
    }
}
