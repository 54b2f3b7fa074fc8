//! Application service: TiDB instance resolution and launch.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    ComponentProcess, ConfigDecoder, HostResolver, PortAllocator, ProcessSpawner,
};
use crate::domain::config::STATUS_BIND_HOST;
use crate::domain::{
    ComponentCommand, ComponentVersion, DEFAULT_STATUS_PORT, InstanceError, InstanceSpec,
    InstanceState, PdPeer, TIDB_COMPONENT, pd_endpoints, resolve_listen_port,
};

/// Caller-supplied description of a TiDB instance, before port resolution.
#[derive(Debug, Clone)]
pub struct TidbParams<'a> {
    /// Binary to run; empty resolves from the component store.
    pub bin_path: &'a Path,
    /// Working directory.
    pub dir: &'a Path,
    /// Bind host.
    pub host: &'a str,
    /// Native config file; an empty path means none.
    pub config_path: &'a Path,
    /// Numeric identity.
    pub id: u32,
    /// Upstream PD peers, in order.
    pub peers: &'a [PdPeer],
    /// Pass `--enable-binlog=true`.
    pub enable_binlog: bool,
}

/// A TiDB server: its resolved descriptor and, once launched, its process.
pub struct TidbInstance<P> {
    spec: InstanceSpec,
    state: InstanceState,
    process: Option<P>,
}

impl<P: ComponentProcess> TidbInstance<P> {
    /// Resolve ports and addresses for a new instance.
    ///
    /// The listening port prefers the config file's `port` over 4000; the
    /// status port prefers 10080 on the wildcard address. Both are confirmed
    /// through `ports`.
    ///
    /// # Errors
    ///
    /// Returns `InstanceError::PortExhausted` if either port cannot be
    /// allocated. Config-file problems are never surfaced.
    pub fn new(
        ports: &impl PortAllocator,
        config: &impl ConfigDecoder,
        hosts: &impl HostResolver,
        params: TidbParams<'_>,
    ) -> Result<Self> {
        let TidbParams {
            bin_path,
            dir,
            host,
            config_path,
            id,
            peers,
            enable_binlog,
        } = params;

        let config_path = (!config_path.as_os_str().is_empty()).then(|| config_path.to_path_buf());
        let probe = config_path.as_deref().map(|path| config.decode(path));
        let preferred = resolve_listen_port(probe);

        let port = ports
            .free_port(host, preferred)
            .with_context(|| format!("allocating {TIDB_COMPONENT} port on {host}"))?;
        let status_port = ports
            .free_port(STATUS_BIND_HOST, DEFAULT_STATUS_PORT)
            .with_context(|| format!("allocating {TIDB_COMPONENT} status port"))?;

        tracing::debug!(id, host, preferred, port, status_port, "resolved tidb ports");

        let spec = InstanceSpec {
            bin_path: bin_path.to_path_buf(),
            id,
            dir: dir.to_path_buf(),
            host: host.to_string(),
            port,
            status_port,
            config_path,
            enable_binlog,
            advertise_host: hosts.advertise_host(host),
            pd_endpoints: pd_endpoints(peers, false, |h| hosts.advertise_host(h)),
        };

        Ok(Self {
            spec,
            state: InstanceState::Resolved,
            process: None,
        })
    }

    /// The invocation `start` would hand to the spawner.
    #[must_use]
    pub fn command(&self, version: &ComponentVersion) -> ComponentCommand {
        ComponentCommand {
            component: TIDB_COMPONENT.to_string(),
            version: version.clone(),
            bin_path: self.spec.bin_path.clone(),
            dir: self.spec.dir.clone(),
            args: self.spec.args(),
        }
    }

    /// Spawn and start `tidb-server`.
    ///
    /// Output redirection to the log file is best-effort: a failure is logged
    /// and the launch continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the instance was already started or failed, if the
    /// spawner cannot prepare the process (including cancellation), or if the
    /// OS cannot start it. The instance is `Failed` afterwards.
    pub fn start<S>(
        &mut self,
        spawner: &S,
        cancel: &CancellationToken,
        version: &ComponentVersion,
    ) -> Result<()>
    where
        S: ProcessSpawner<Process = P>,
    {
        match self.state {
            InstanceState::Resolved => {}
            InstanceState::Launched => {
                return Err(InstanceError::AlreadyStarted {
                    component: TIDB_COMPONENT.to_string(),
                }
                .into());
            }
            InstanceState::Failed => {
                return Err(InstanceError::InvalidState {
                    component: TIDB_COMPONENT.to_string(),
                }
                .into());
            }
        }

        let mut process = match spawner.new_component_process(cancel, self.command(version)) {
            Ok(process) => process,
            Err(e) => {
                self.state = InstanceState::Failed;
                return Err(e.context(format!("preparing {TIDB_COMPONENT} process")));
            }
        };

        let log_file = self.log_file();
        if let Err(e) = process.set_output_file(&log_file) {
            tracing::warn!(
                error = %format!("{e:#}"),
                log_file = %log_file.display(),
                "launching tidb without output redirection",
            );
        }

        if let Err(e) = process.start() {
            self.state = InstanceState::Failed;
            return Err(e.context(format!("starting {TIDB_COMPONENT}")));
        }

        tracing::info!(
            id = self.spec.id,
            pid = process.pid(),
            addr = %self.addr(),
            version = %version,
            "tidb launched",
        );
        self.process = Some(process);
        self.state = InstanceState::Launched;
        Ok(())
    }

    /// Component tag, always `tidb`.
    #[must_use]
    pub fn component(&self) -> &'static str {
        TIDB_COMPONENT
    }

    /// `<dir>/tidb.log`.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.spec.log_file()
    }

    /// Address clients should connect to.
    #[must_use]
    pub fn addr(&self) -> String {
        self.spec.addr()
    }

    #[must_use]
    pub fn spec(&self) -> &InstanceSpec {
        &self.spec
    }

    #[must_use]
    pub fn state(&self) -> InstanceState {
        self.state
    }

    /// The running process, once launched.
    #[must_use]
    pub fn process(&self) -> Option<&P> {
        self.process.as_ref()
    }

    pub fn process_mut(&mut self) -> Option<&mut P> {
        self.process.as_mut()
    }
}
