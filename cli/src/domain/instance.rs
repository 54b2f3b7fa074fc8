//! Resolved TiDB instance descriptor and launch-argument assembly.
//!
//! Pure functions only. No I/O.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::host::join_host_port;
use crate::domain::version::ComponentVersion;

// ── Constants ────────────────────────────────────────────────────────────────

/// Component tag of the SQL front-end.
pub const TIDB_COMPONENT: &str = "tidb";

/// Log file name written inside the instance directory.
pub const TIDB_LOG_FILE: &str = "tidb.log";

/// Storage backend selector. The SQL layer always runs against TiKV.
pub const TIDB_STORE: &str = "tikv";

// ── Descriptor ───────────────────────────────────────────────────────────────

/// One cluster member's resolved identity.
///
/// Both ports were confirmed free by the allocator when this was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceSpec {
    /// Binary to run. Empty means "resolve from the component store".
    pub bin_path: PathBuf,
    /// Numeric identity, used for log and directory naming.
    pub id: u32,
    /// Working directory; the log file lives here.
    pub dir: PathBuf,
    /// Bind host passed to `--host`.
    pub host: String,
    /// MySQL protocol listening port.
    pub port: u16,
    /// Status / metrics port.
    pub status_port: u16,
    /// Native config file, if any.
    pub config_path: Option<PathBuf>,
    /// Whether to pass `--enable-binlog=true`.
    pub enable_binlog: bool,
    /// Connectable form of `host`.
    pub advertise_host: String,
    /// Upstream PD endpoints, already rendered.
    pub pd_endpoints: Vec<String>,
}

impl InstanceSpec {
    /// `<dir>/tidb.log`.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        log_file(&self.dir)
    }

    /// `<advertise_host>:<port>`.
    #[must_use]
    pub fn addr(&self) -> String {
        join_host_port(&self.advertise_host, self.port)
    }

    /// Command-line arguments for `tidb-server`, in launch order.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-P".to_string(),
            self.port.to_string(),
            format!("--store={TIDB_STORE}"),
            format!("--host={}", self.host),
            format!("--status={}", self.status_port),
            format!("--path={}", self.pd_endpoints.join(",")),
            format!("--log-file={}", self.log_file().display()),
        ];
        if let Some(config) = &self.config_path {
            args.push(format!("--config={}", config.display()));
        }
        if self.enable_binlog {
            args.push("--enable-binlog=true".to_string());
        }
        args
    }
}

/// Log file location for an instance directory.
#[must_use]
pub fn log_file(dir: &Path) -> PathBuf {
    dir.join(TIDB_LOG_FILE)
}

// ── Launch command ───────────────────────────────────────────────────────────

/// Everything a process spawner needs to start a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentCommand {
    /// Component tag, e.g. `tidb`.
    pub component: String,
    /// Version used to resolve the binary when `bin_path` is empty.
    #[serde(serialize_with = "serialize_display")]
    pub version: ComponentVersion,
    /// Binary path; may be empty.
    pub bin_path: PathBuf,
    /// Working directory of the child.
    pub dir: PathBuf,
    /// Ordered arguments.
    pub args: Vec<String>,
}

fn serialize_display<S: serde::Serializer>(
    value: &ComponentVersion,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

/// Where an instance is in its lifecycle. `Launched` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    /// Ports resolved, nothing spawned yet.
    Resolved,
    /// The OS process was started.
    Launched,
    /// Spawn or start failed.
    Failed,
}

// ── Unit tests ───────────────────────────────────────────────────────────────
