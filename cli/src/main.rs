//! tiplay - launch and supervise local TiDB servers

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tiplay_cli::cli::Cli;
use tiplay_cli::domain::InstanceError;
use tiplay_cli::output::json;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let json_mode = cli.json;
    if let Err(e) = cli.run().await {
        if json_mode {
            let code = e
                .downcast_ref::<InstanceError>()
                .map_or("error", InstanceError::code);
            match json::format_error(&format!("{e:#}"), code) {
                Ok(out) => println!("{out}"),
                Err(_) => eprintln!("Error: {e:#}"),
            }
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}
