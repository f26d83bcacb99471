use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

/// Reads identity documents from a serial MRZ scanner and reports each scan
/// as one JSON line on stdout.
#[derive(Parser, Debug)]
#[command(name = "doorscan", version, about)]
struct Cli {
    /// Reader config file. Defaults to config.toml in the platform config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Read scans from the scanner device until it closes or Ctrl-C.
    Listen {
        /// Device node, overriding the config file and DOORSCAN_DEVICE.
        #[arg(long)]
        device: Option<PathBuf>,
        /// Read the byte stream from stdin instead of a device.
        #[arg(long, conflicts_with = "device")]
        stdin: bool,
    },
    /// Decode MRZ text from a file, or stdin when no file is given.
    Decode {
        file: Option<PathBuf>,
    },
    /// Print the effective reader configuration.
    Status,
}

/// Blocking reads (stdin, a wedged device) must not keep the process alive
/// after the command returns.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries scan events only.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(cli));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Listen { device, stdin } => {
            let source = match (stdin, device) {
                (true, _) => commands::Source::Stdin,
                (false, Some(path)) => commands::Source::Device(path),
                (false, None) => commands::Source::Device(config.device.clone()),
            };
            commands::listen(&config, source).await
        }
        Commands::Decode { file } => commands::decode(file.as_deref()).await,
        Commands::Status => commands::status(&config),
    }
}
