//! Application context: unified state passed to every command handler.
//!
//! `AppContext` owns the production port implementations and the output
//! settings, so command handlers take one `&AppContext` instead of a loose
//! list of collaborators.

use std::path::PathBuf;

use crate::infra::config::TomlConfigDecoder;
use crate::infra::network::InterfaceHostResolver;
use crate::infra::port::FreePortAllocator;
use crate::infra::process::TokioProcessSpawner;
use crate::infra::store::ComponentStore;
use crate::output::{HumanRenderer, OutputContext};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Overrides the tiplay home directory (`TIPLAY_HOME`).
    pub home: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context. Quiet in JSON mode so only the JSON
    /// document reaches stdout.
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Free-port allocator shared by every instance this process resolves.
    pub ports: FreePortAllocator,
    /// Native config decoder.
    pub config: TomlConfigDecoder,
    /// Advertise-host resolver.
    pub hosts: InterfaceHostResolver,
    /// Component process spawner.
    pub spawner: TokioProcessSpawner,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let store = ComponentStore::from_home(flags.home);
        match &store {
            Some(store) => tracing::debug!(root = %store.root().display(), "component store"),
            None => tracing::debug!("no home directory; component store disabled"),
        }

        Self {
            output: OutputContext::new(
                flags.output.no_color,
                flags.output.quiet || flags.output.json,
            ),
            mode,
            ports: FreePortAllocator::new(),
            config: TomlConfigDecoder,
            hosts: InterfaceHostResolver,
            spawner: TokioProcessSpawner::new(store),
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Human renderer over this context's output settings.
    #[must_use]
    pub fn renderer(&self) -> HumanRenderer<'_> {
        HumanRenderer::new(&self.output)
    }
}
