mod script;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use retrace_config::EditorConfig;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use script::Script;

/// Replays a scripted editing session against the history engine and prints
/// the resulting state as JSON.
#[derive(Parser, Debug)]
#[command(name = "retrace", version, about)]
struct Cli {
    /// JSON script with the regions and steps to replay.
    script: PathBuf,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the coalescing delay in milliseconds.
    #[arg(long = "delay-ms")]
    delay_ms: Option<u64>,
}

/// Log filter used before the configured one is known.
const BOOTSTRAP_LOG_FILTER: &str = "warn";

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Loads the config and applies CLI overrides.
///
/// The configured log filter lives in the config itself, so problems
/// loading it are reported through a bootstrap subscriber on `log_writer`.
fn load_config<W>(path: &Path, delay_ms: Option<u64>, log_writer: W) -> EditorConfig
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(log_writer)
        .with_env_filter(env_filter(BOOTSTRAP_LOG_FILTER))
        .finish();
    let mut config =
        tracing::subscriber::with_default(bootstrap, || EditorConfig::load_or_create(path));
    if let Some(ms) = delay_ms {
        config.history_stack_delay_ms = ms;
        config.sanitize();
    }
    config
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(EditorConfig::config_path);
    let config = load_config(&config_path, cli.delay_ms, std::io::stderr);

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(&config.log_filter))
        .init();

    tracing::info!("Replaying {}", cli.script.display());

    let script = Script::load(&cli.script)?;
    let report = script.replay(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
