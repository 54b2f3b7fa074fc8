//! Upstream coordinator (PD) peers.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InstanceError;
use crate::domain::host::join_host_port;

/// A PD endpoint this instance connects to for metadata and placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdPeer {
    /// Host the PD client port listens on (may be a wildcard).
    pub host: String,
    /// PD client port.
    pub port: u16,
}

impl PdPeer {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl FromStr for PdPeer {
    type Err = InstanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InstanceError::InvalidPeer(s.to_string());
        let (host, port) = s.trim().rsplit_once(':').ok_or_else(invalid)?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() {
            return Err(invalid());
        }
        let port: u16 = port.parse().map_err(|_| invalid())?;
        if port == 0 {
            return Err(invalid());
        }
        Ok(Self::new(host, port))
    }
}

impl fmt::Display for PdPeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_host_port(&self.host, self.port))
    }
}

/// Render connectable endpoint strings for `peers`, in order.
///
/// `advertise` maps each peer's bind host to something reachable;
/// `http` prefixes every endpoint with `http://`.
pub fn pd_endpoints(peers: &[PdPeer], http: bool, advertise: impl Fn(&str) -> String) -> Vec<String> {
    peers
        .iter()
        .map(|peer| {
            let endpoint = join_host_port(&advertise(&peer.host), peer.port);
            if http {
                format!("http://{endpoint}")
            } else {
                endpoint
            }
        })
        .collect()
}
