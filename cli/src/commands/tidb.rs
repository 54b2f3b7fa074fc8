//! `tiplay tidb`: resolve, launch and supervise one TiDB server.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;
use crate::application::ports::{ComponentProcess, ProgressReporter};
use crate::application::services::tidb::{TidbInstance, TidbParams};
use crate::domain::{ComponentVersion, PdPeer};
use crate::infra::process::TokioComponentProcess;
use crate::output::{TerminalReporter, json};

/// Arguments for the tidb command.
#[derive(Args, Debug)]
pub struct TidbArgs {
    /// Component version used to locate an installed tidb-server
    #[arg(value_name = "VERSION", default_value = "nightly")]
    pub component_version: ComponentVersion,

    /// Path to tidb-server (default: the installed component)
    #[arg(long, value_name = "PATH", default_value = "")]
    pub binpath: PathBuf,

    /// Working directory (default: data/tidb-<ID>)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "TIPLAY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// tidb-server TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Instance number
    #[arg(long, default_value_t = 0)]
    pub id: u32,

    /// PD endpoint (repeatable or comma-separated)
    #[arg(long = "pd", value_name = "HOST:PORT", value_delimiter = ',')]
    pub pd: Vec<PdPeer>,

    /// Start tidb-server with binlog enabled
    #[arg(long)]
    pub enable_binlog: bool,

    /// Print the resolved command without starting it
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the tidb command.
///
/// # Errors
///
/// Returns an error if ports cannot be allocated, the process cannot be
/// launched, or it exits unsuccessfully.
pub async fn run(app: &AppContext, args: &TidbArgs) -> Result<()> {
    // The child runs inside `dir`, so every path it receives must be absolute.
    let dir = args
        .dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("data").join(format!("tidb-{}", args.id)));
    let dir = absolute(&dir)?;
    let config_path = match &args.config {
        Some(path) => absolute(path)?,
        None => PathBuf::new(),
    };

    let mut instance: TidbInstance<TokioComponentProcess> = TidbInstance::new(
        &app.ports,
        &app.config,
        &app.hosts,
        TidbParams {
            bin_path: &args.binpath,
            dir: &dir,
            host: &args.host,
            config_path: &config_path,
            id: args.id,
            peers: &args.pd,
            enable_binlog: args.enable_binlog,
        },
    )?;

    if args.dry_run {
        let command = instance.command(&args.component_version);
        if app.is_json() {
            println!("{}", json::format_plan(instance.spec(), &command)?);
        } else {
            app.renderer().render_plan(instance.spec(), &command);
        }
        return Ok(());
    }

    let reporter = TerminalReporter::new(&app.output);
    reporter.step(&format!("starting {} {}...", instance.component(), args.component_version));

    let cancel = CancellationToken::new();
    instance.start(&app.spawner, &cancel, &args.component_version)?;

    let spec = instance.spec().clone();
    let process = instance
        .process_mut()
        .context("launched instance has no process")?;
    if app.is_json() {
        let command = process.command().clone();
        println!("{}", json::format_plan(&spec, &command)?);
    } else {
        reporter.success(&format!("tidb is running at {}", spec.addr()));
        app.renderer().render_launched(&spec, process.pid());
        app.output.info("press Ctrl+C to stop tidb");
    }
    tracing::debug!(binary = %process.binary().display(), pid = ?process.pid(), "supervising tidb");

    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };
    let status = process.wait().await;
    interrupt.abort();
    let status = status?;

    if cancel.is_cancelled() {
        reporter.warn(&format!("interrupted, tidb stopped after {:?}", process.uptime()));
        return Ok(());
    }
    if !status.success() {
        anyhow::bail!(
            "tidb exited with {status}; see {}",
            spec.log_file().display()
        );
    }
    reporter.success("tidb exited");
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("cannot resolve {}", path.display()))
}
