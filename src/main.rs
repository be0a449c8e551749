use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use parley::{Commands, Container, ContainerConfig, Router};

#[derive(Parser)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Module name recorded in log entries and used for the diagnostic log directory
    #[arg(short, long, global = true, default_value = "parley")]
    module: String,

    /// Root directory for all logs (defaults to PARLEY_LOG_DIR, then ./logs)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Answer with an offline echo client instead of calling the API
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(cli.verbose, std::env::var("RUST_LOG").ok()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }

    let container = Container::new(ContainerConfig {
        module: cli.module,
        log_dir: cli.log_dir,
        mock: cli.mock,
        echo_diagnostics: cli.verbose,
        offline: cli.command.is_offline(),
    })?;
    if let Some(path) = container.diagnostic_path() {
        debug!("Diagnostic log: {}", path.display());
    }

    let router = Router::new(&container);
    let output = router.route(cli.command).await?;
    println!("{output}");

    Ok(())
}

/// `--verbose` forces debug output; otherwise `RUST_LOG` applies, falling
/// back to warnings only.
fn log_filter(verbose: bool, rust_log: Option<String>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}
