use anyhow::Result;
use clap::Parser;
use color_eyre::config::HookBuilder;
use s3seed_core::{
    load_optional_config, AwsCli, Backend, LoggingConfig, ObjectStore, Overrides, RunConfig,
    SdkStore, PAIRS_ENV_VAR,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod runner;

use runner::Runner;

/// s3seed - copy required data between S3 and local paths at startup
#[derive(Parser, Debug)]
#[command(name = "s3seed")]
#[command(version)]
#[command(
    about = "Copy a list of source:destination pairs between S3 and the local filesystem",
    long_about = None
)]
struct Cli {
    /// Print timestamped progress lines
    #[arg(short, long)]
    verbose: bool,

    /// Print intended commands without transferring anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Comma-separated source:destination pairs
    #[arg(long, env = PAIRS_ENV_VAR, hide_env_values = true)]
    pairs: Option<String>,

    /// Configuration file (default: ~/.config/s3seed/config.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transfer backend for remote operations (cli, sdk)
    #[arg(long)]
    backend: Option<Backend>,

    /// AWS CLI program name or path
    #[arg(long)]
    aws_bin: Option<String>,

    /// Custom S3-compatible endpoint URL
    #[arg(long)]
    endpoint_url: Option<String>,

    /// AWS region
    #[arg(long)]
    region: Option<String>,
}

impl Cli {
    fn into_overrides(self) -> Overrides {
        Overrides {
            pairs: self.pairs,
            dry_run: self.dry_run,
            verbose: self.verbose,
            backend: self.backend,
            aws_bin: self.aws_bin,
            endpoint_url: self.endpoint_url,
            region: self.region,
        }
    }
}

/// Verbose mode logs this crate at debug level to stdout with timestamps;
/// otherwise warnings (or the configured level) go to stderr. `RUST_LOG`
/// overrides both.
fn init_logging(verbose: bool, logging: Option<&LoggingConfig>) {
    let default_filter = if verbose {
        "warn,s3seed=debug,s3seed_core=debug".to_string()
    } else {
        logging
            .map(|l| l.level.clone())
            .unwrap_or_else(|| "warn".to_string())
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stdout)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .without_time()
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Setup error handling
    if let Err(e) = HookBuilder::default().install() {
        eprintln!("Warning: Failed to install error handler: {}", e);
    }

    // Parse CLI arguments
    let cli = Cli::parse();

    let file = load_optional_config(cli.config.as_deref())?;
    init_logging(cli.verbose, file.as_ref().and_then(|f| f.logging.as_ref()));

    let config = RunConfig::resolve(cli.into_overrides(), file)?;
    tracing::debug!(backend = %config.client.backend, dry_run = config.dry_run, "Resolved configuration");

    let store: Box<dyn ObjectStore> = match config.client.backend {
        Backend::Cli => Box::new(AwsCli::from_config(&config.client)?),
        Backend::Sdk => Box::new(SdkStore::new(&config.client).await?),
    };

    let summary = Runner::new(&config, store.as_ref()).run().await;
    summary.print(config.dry_run);

    Ok(summary.exit_code())
}
