//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::domain::{ComponentCommand, TidbConfig};

// ── Resolution Ports ──────────────────────────────────────────────────────────

/// Decodes the native engine's config file.
pub trait ConfigDecoder {
    /// Read and decode `path`.
    ///
    /// # Errors
    ///
    /// Returns `InstanceError::ConfigRead` or `InstanceError::ConfigDecode`.
    fn decode(&self, path: &Path) -> Result<TidbConfig>;
}

/// Hands out TCP ports that are free on a host.
///
/// Implementations must be safe for concurrent callers: two requests for the
/// same `host` never receive the same port, even with the same `preferred`.
pub trait PortAllocator {
    /// Return `preferred` if it is free on `host`, otherwise another free port.
    ///
    /// # Errors
    ///
    /// Returns `InstanceError::PortExhausted` when no port can be found.
    fn free_port(&self, host: &str, preferred: u16) -> Result<u16>;
}

/// Maps a bind address to an externally connectable host.
pub trait HostResolver {
    /// Connectable form of `listen`.
    fn advertise_host(&self, listen: &str) -> String;
}

// ── Process Ports ─────────────────────────────────────────────────────────────

/// A component process that has been prepared and can be started once.
#[allow(async_fn_in_trait)]
pub trait ComponentProcess {
    /// Send stdout and stderr of the child to `path`. Must be called before
    /// `start`.
    ///
    /// # Errors
    ///
    /// Returns `InstanceError::OutputRedirect` if the file cannot be opened.
    fn set_output_file(&mut self, path: &Path) -> Result<()>;

    /// Launch the OS process. Returns once it is running, not once it is ready.
    ///
    /// # Errors
    ///
    /// Returns `InstanceError::ProcessStart` if the OS refuses to start it.
    fn start(&mut self) -> Result<()>;

    /// OS process id, once started.
    fn pid(&self) -> Option<u32>;

    /// Time since `start`, zero before that.
    fn uptime(&self) -> Duration;

    /// The invocation this process was prepared with.
    fn command(&self) -> &ComponentCommand;

    /// Wait for the child to exit. The child is killed if the launch token is
    /// cancelled first.
    ///
    /// # Errors
    ///
    /// Returns an error if the process was never started or waiting fails.
    async fn wait(&mut self) -> Result<ExitStatus>;
}

/// Generic process construction primitive.
pub trait ProcessSpawner {
    /// Concrete process handle produced by this spawner.
    type Process: ComponentProcess;

    /// Prepare (but do not start) a component process.
    ///
    /// # Errors
    ///
    /// Fails fast with `InstanceError::Cancelled` if `cancel` already fired,
    /// and with a spawn-construction error if the binary or working directory
    /// is unusable.
    fn new_component_process(
        &self,
        cancel: &CancellationToken,
        command: ComponentCommand,
    ) -> Result<Self::Process>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
