//! Free-port allocation: implements `PortAllocator` by probing the OS.

use std::collections::HashSet;
use std::net::TcpListener;
use std::sync::{Mutex, PoisonError};

use anyhow::Result;

use crate::application::ports::PortAllocator;
use crate::domain::InstanceError;
use crate::domain::host::is_wildcard;

/// How many OS-assigned ports to try before giving up.
const MAX_EPHEMERAL_ATTEMPTS: usize = 64;

/// Production `PortAllocator`.
///
/// Remembers every `host:port` it has handed out, so instances resolved
/// through the same allocator never collide even before their processes bind.
/// The registry lock is held across probing, which makes each allocation
/// atomic for concurrent callers.
#[derive(Default)]
pub struct FreePortAllocator {
    handed_out: Mutex<HashSet<(String, u16)>>,
}

impl FreePortAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PortAllocator for FreePortAllocator {
    fn free_port(&self, host: &str, preferred: u16) -> Result<u16> {
        let mut handed_out = self
            .handed_out
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if preferred != 0
            && !handed_out.contains(&(host.to_string(), preferred))
            && is_port_available(host, preferred)
        {
            handed_out.insert((host.to_string(), preferred));
            return Ok(preferred);
        }

        for _ in 0..MAX_EPHEMERAL_ATTEMPTS {
            let Some(port) = ephemeral_port(host) else {
                break;
            };
            if handed_out.insert((host.to_string(), port)) {
                tracing::debug!(host, preferred, port, "preferred port taken, using substitute");
                return Ok(port);
            }
        }

        Err(InstanceError::PortExhausted {
            host: host.to_string(),
            preferred,
        }
        .into())
    }
}

fn bind_host(host: &str) -> &str {
    if is_wildcard(host) { "0.0.0.0" } else { host }
}

fn is_port_available(host: &str, port: u16) -> bool {
    TcpListener::bind((bind_host(host), port)).is_ok()
}

/// Ask the OS for any free port on `host`.
fn ephemeral_port(host: &str) -> Option<u16> {
    let listener = TcpListener::bind((bind_host(host), 0)).ok()?;
    listener.local_addr().ok().map(|addr| addr.port())
}
