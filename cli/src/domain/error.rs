//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. Callers that need to branch on a failure recover the
//! variant with `anyhow::Error::downcast_ref::<InstanceError>()`.

use std::path::PathBuf;

use thiserror::Error;

// ── Instance errors ───────────────────────────────────────────────────────────

/// Errors raised while resolving or launching a cluster member.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("cannot read config file {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {}", path.display())]
    ConfigDecode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no free port available on {host} (preferred {preferred})")]
    PortExhausted { host: String, preferred: u16 },

    #[error("{component} binary not found at {}", path.display())]
    BinaryNotFound { component: String, path: PathBuf },

    #[error("{component} binary at {} is not executable", path.display())]
    NotExecutable { component: String, path: PathBuf },

    #[error("cannot locate {component} {version}: home directory unknown and TIPLAY_HOME unset")]
    ComponentNotInstalled { component: String, version: String },

    #[error("cannot prepare working directory {}", dir.display())]
    WorkDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("launch of {component} cancelled")]
    Cancelled { component: String },

    #[error("cannot redirect output to {}", path.display())]
    OutputRedirect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start {component} ({})", binary.display())]
    ProcessStart {
        component: String,
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{component} instance is already started")]
    AlreadyStarted { component: String },

    #[error("{component} instance failed earlier and cannot be started again")]
    InvalidState { component: String },

    #[error("Invalid peer address '{0}': expected host:port")]
    InvalidPeer(String),

    #[error("Invalid component version '{0}': expected 'nightly' or a semantic version like v7.5.0")]
    InvalidVersion(String),
}

impl InstanceError {
    /// Stable machine-readable code for `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigRead { .. } | Self::ConfigDecode { .. } => "config_unreadable",
            Self::PortExhausted { .. } => "port_exhausted",
            Self::BinaryNotFound { .. }
            | Self::NotExecutable { .. }
            | Self::ComponentNotInstalled { .. }
            | Self::WorkDir { .. } => "spawn_failed",
            Self::Cancelled { .. } => "cancelled",
            Self::OutputRedirect { .. } => "output_redirect_failed",
            Self::ProcessStart { .. } => "start_failed",
            Self::AlreadyStarted { .. } | Self::InvalidState { .. } => "invalid_state",
            Self::InvalidPeer(_) | Self::InvalidVersion(_) => "invalid_argument",
        }
    }
}
