//! Infrastructure implementation of the `ProcessSpawner` and
//! `ComponentProcess` ports.
//!
//! `TokioProcessSpawner` prepares `tokio::process` commands for component
//! binaries; `TokioComponentProcess` owns the child once started. Children are
//! spawned with `kill_on_drop(true)` and are killed by `wait` when the launch
//! token is cancelled, so no launch path leaves an orphan behind.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ComponentProcess, ProcessSpawner};
use crate::domain::{ComponentCommand, InstanceError};
use crate::infra::store::ComponentStore;

/// Production `ProcessSpawner`.
pub struct TokioProcessSpawner {
    store: Option<ComponentStore>,
}

impl TokioProcessSpawner {
    /// `store` resolves binaries for commands with an empty `bin_path`.
    #[must_use]
    pub fn new(store: Option<ComponentStore>) -> Self {
        Self { store }
    }

    fn resolve_binary(&self, command: &ComponentCommand) -> Result<PathBuf, InstanceError> {
        let candidate = if command.bin_path.as_os_str().is_empty() {
            let store = self
                .store
                .as_ref()
                .ok_or_else(|| InstanceError::ComponentNotInstalled {
                    component: command.component.clone(),
                    version: command.version.to_string(),
                })?;
            store.binary_path(&command.component, &command.version)
        } else {
            command.bin_path.clone()
        };

        // Canonical so the child's working directory does not change what runs.
        let binary = std::fs::canonicalize(&candidate).map_err(|_| InstanceError::BinaryNotFound {
            component: command.component.clone(),
            path: candidate.clone(),
        })?;
        check_executable(&command.component, &binary)?;
        Ok(binary)
    }
}

impl ProcessSpawner for TokioProcessSpawner {
    type Process = TokioComponentProcess;

    fn new_component_process(
        &self,
        cancel: &CancellationToken,
        command: ComponentCommand,
    ) -> Result<TokioComponentProcess> {
        if cancel.is_cancelled() {
            return Err(InstanceError::Cancelled {
                component: command.component,
            }
            .into());
        }

        let binary = self.resolve_binary(&command)?;
        std::fs::create_dir_all(&command.dir).map_err(|source| InstanceError::WorkDir {
            dir: command.dir.clone(),
            source,
        })?;

        tracing::debug!(
            component = %command.component,
            version = %command.version,
            binary = %binary.display(),
            "prepared component process",
        );

        Ok(TokioComponentProcess {
            command,
            binary,
            cancel: cancel.clone(),
            output: None,
            child: None,
            started_at: None,
        })
    }
}

fn check_executable(component: &str, binary: &Path) -> Result<(), InstanceError> {
    let not_executable = || InstanceError::NotExecutable {
        component: component.to_string(),
        path: binary.to_path_buf(),
    };
    let meta = std::fs::metadata(binary).map_err(|_| not_executable())?;
    if !meta.is_file() {
        return Err(not_executable());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 == 0 {
            return Err(not_executable());
        }
    }
    Ok(())
}

/// A component child process driven by tokio.
pub struct TokioComponentProcess {
    command: ComponentCommand,
    binary: PathBuf,
    cancel: CancellationToken,
    /// stdout and stderr handles of the log file.
    output: Option<(File, File)>,
    child: Option<tokio::process::Child>,
    started_at: Option<Instant>,
}

impl TokioComponentProcess {
    /// Resolved binary this process runs.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl ComponentProcess for TokioComponentProcess {
    fn set_output_file(&mut self, path: &Path) -> Result<()> {
        let redirect = |source| InstanceError::OutputRedirect {
            path: path.to_path_buf(),
            source,
        };
        let stdout = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(redirect)?;
        let stderr = stdout.try_clone().map_err(redirect)?;
        self.output = Some((stdout, stderr));
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if self.child.is_some() {
            anyhow::bail!("{} is already running", self.command.component);
        }

        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.args(&self.command.args)
            .current_dir(&self.command.dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        match self.output.take() {
            Some((stdout, stderr)) => {
                cmd.stdout(stdout).stderr(stderr);
            }
            // Unredirected output lands on our stderr so stdout stays machine-readable.
            None => {
                cmd.stdout(std::io::stderr()).stderr(Stdio::inherit());
            }
        }

        let child = cmd.spawn().map_err(|source| InstanceError::ProcessStart {
            component: self.command.component.clone(),
            binary: self.binary.clone(),
            source,
        })?;
        self.child = Some(child);
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(tokio::process::Child::id)
    }

    fn uptime(&self) -> Duration {
        self.started_at.map_or(Duration::ZERO, |t| t.elapsed())
    }

    fn command(&self) -> &ComponentCommand {
        &self.command
    }

    async fn wait(&mut self) -> Result<ExitStatus> {
        let component = self.command.component.clone();
        let child = self
            .child
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("{component} was never started"))?;

        tokio::select! {
            status = child.wait() => status.with_context(|| format!("waiting for {component}")),
            () = self.cancel.cancelled() => {
                tracing::debug!(component = %component, "launch cancelled, killing child");
                child
                    .kill()
                    .await
                    .with_context(|| format!("killing {component}"))?;
                child.wait().await.with_context(|| format!("waiting for {component}"))
            }
        }
    }
}
