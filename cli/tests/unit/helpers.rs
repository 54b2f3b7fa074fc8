//! Shared test helpers: fake process ports, mocks and constructors.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use mockall::mock;
use tokio_util::sync::CancellationToken;

use tiplay_cli::application::ports::{
    ComponentProcess, ConfigDecoder, HostResolver, PortAllocator, ProcessSpawner,
};
use tiplay_cli::domain::{ComponentCommand, InstanceError, TidbConfig};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Mocks: resolution ports ──────────────────────────────────────────────────

mock! {
    pub Ports {}
    impl PortAllocator for Ports {
        fn free_port(&self, host: &str, preferred: u16) -> Result<u16>;
    }
}

mock! {
    pub Config {}
    impl ConfigDecoder for Config {
        fn decode(&self, path: &Path) -> Result<TidbConfig>;
    }
}

/// Allocator that grants every preferred port and records the requests.
#[derive(Default)]
pub struct GrantingPorts {
    requests: Mutex<Vec<(String, u16)>>,
}

impl GrantingPorts {
    pub fn requests(&self) -> Vec<(String, u16)> {
        self.requests.lock().expect("lock").clone()
    }
}

impl PortAllocator for GrantingPorts {
    fn free_port(&self, host: &str, preferred: u16) -> Result<u16> {
        self.requests
            .lock()
            .expect("lock")
            .push((host.to_string(), preferred));
        Ok(preferred)
    }
}

/// Config decoder for tests that never pass a config file.
pub struct NoConfig;

impl ConfigDecoder for NoConfig {
    fn decode(&self, path: &Path) -> Result<TidbConfig> {
        anyhow::bail!("decode({}) not expected in this test", path.display())
    }
}

/// Advertises `10.0.0.1` for the wildcard address, anything else unchanged.
pub struct FixedHosts;

impl HostResolver for FixedHosts {
    fn advertise_host(&self, listen: &str) -> String {
        if listen == "0.0.0.0" {
            "10.0.0.1".to_string()
        } else {
            listen.to_string()
        }
    }
}

// ── Fake: process ports ──────────────────────────────────────────────────────

/// What a fake process has been asked to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessEvents {
    pub output_file: Option<PathBuf>,
    pub started: bool,
}

/// A process that records calls instead of spawning anything.
pub struct FakeProcess {
    command: ComponentCommand,
    fail_redirect: bool,
    fail_start: bool,
    pub events: ProcessEvents,
}

impl ComponentProcess for FakeProcess {
    fn set_output_file(&mut self, path: &Path) -> Result<()> {
        if self.fail_redirect {
            return Err(InstanceError::OutputRedirect {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }
            .into());
        }
        self.events.output_file = Some(path.to_path_buf());
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(InstanceError::ProcessStart {
                component: self.command.component.clone(),
                binary: self.command.bin_path.clone(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }
            .into());
        }
        self.events.started = true;
        Ok(())
    }

    fn pid(&self) -> Option<u32> {
        self.events.started.then_some(4242)
    }

    fn uptime(&self) -> Duration {
        Duration::ZERO
    }

    fn command(&self) -> &ComponentCommand {
        &self.command
    }

    async fn wait(&mut self) -> Result<ExitStatus> {
        Ok(exit_status(0))
    }
}

/// Which step a `FakeSpawner`'s processes should fail at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailAt {
    #[default]
    Nothing,
    Construct,
    Redirect,
    Start,
}

/// Spawner that hands out `FakeProcess`es and records every command.
#[derive(Default)]
pub struct FakeSpawner {
    pub fail_at: FailAt,
    commands: Mutex<Vec<ComponentCommand>>,
}

impl FakeSpawner {
    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            fail_at,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<ComponentCommand> {
        self.commands.lock().expect("lock").clone()
    }
}

impl ProcessSpawner for FakeSpawner {
    type Process = FakeProcess;

    fn new_component_process(
        &self,
        cancel: &CancellationToken,
        command: ComponentCommand,
    ) -> Result<FakeProcess> {
        if cancel.is_cancelled() {
            return Err(InstanceError::Cancelled {
                component: command.component,
            }
            .into());
        }
        if self.fail_at == FailAt::Construct {
            return Err(InstanceError::BinaryNotFound {
                component: command.component.clone(),
                path: command.bin_path.clone(),
            }
            .into());
        }
        self.commands.lock().expect("lock").push(command.clone());
        Ok(FakeProcess {
            command,
            fail_redirect: self.fail_at == FailAt::Redirect,
            fail_start: self.fail_at == FailAt::Start,
            events: ProcessEvents::default(),
        })
    }
}
