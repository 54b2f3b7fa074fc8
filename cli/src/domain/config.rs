//! Native TiDB configuration subset and listening-port resolution.
//!
//! Pure functions only. No I/O.

use anyhow::Result;
use serde::Deserialize;

// ── Constants ────────────────────────────────────────────────────────────────

/// Listening port used when no config file overrides it.
pub const DEFAULT_PORT: u16 = 4000;

/// Preferred status (metrics/diagnostics) port.
pub const DEFAULT_STATUS_PORT: u16 = 10080;

/// Bind address the status port is always allocated on.
pub const STATUS_BIND_HOST: &str = "0.0.0.0";

// ── Config schema ────────────────────────────────────────────────────────────

/// The part of `tidb-server`'s TOML config this launcher cares about.
///
/// Every other key in the file is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TidbConfig {
    /// MySQL protocol listening port. `tidb-server` itself decodes keys
    /// case-insensitively, so `Port` is accepted too.
    #[serde(alias = "Port")]
    pub port: Option<i64>,
}

impl TidbConfig {
    /// The configured port, if it is strictly positive and a valid TCP port.
    #[must_use]
    pub fn explicit_port(&self) -> Option<u16> {
        self.port
            .filter(|p| *p > 0)
            .and_then(|p| u16::try_from(p).ok())
    }
}

// ── Resolution ───────────────────────────────────────────────────────────────

/// Pick the preferred listening port from an optional config probe.
///
/// `None` means no config file was given. A probe error is deliberately
/// dropped here and nowhere else: a broken config file leaves the default in
/// place instead of failing the launch.
#[must_use]
pub fn resolve_listen_port(probe: Option<Result<TidbConfig>>) -> u16 {
    let config = match probe {
        None => return DEFAULT_PORT,
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            tracing::debug!(error = %format!("{e:#}"), "ignoring unreadable tidb config");
            return DEFAULT_PORT;
        }
    };
    config.explicit_port().unwrap_or(DEFAULT_PORT)
}

// ── Unit tests ───────────────────────────────────────────────────────────────
