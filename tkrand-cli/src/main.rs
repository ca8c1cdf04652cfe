//! CLI for the TKey random-generator app.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tkey-random",
    version,
    about = "Fetch random bytes from the random-generator app on a TKey"
)]
struct Cli {
    /// Serial device of the TKey (e.g. /dev/ttyACM0).
    #[arg(long, env = "TKEY_PORT", required_unless_present = "completion")]
    port: Option<PathBuf>,

    /// Serial line speed in baud.
    #[arg(long, default_value_t = tkrand::DEFAULT_SPEED)]
    speed: u32,

    /// Number of random bytes to fetch.
    #[arg(short = 'b', long = "bytes", default_value_t = 32)]
    bytes: usize,

    /// Output format.
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Log every frame sent and received.
    #[arg(short, long)]
    verbose: bool,

    /// Print a shell completion script and exit.
    #[arg(long, hide = true, value_name = "SHELL")]
    completion: Option<Shell>,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Hex on stdout, app identity on stderr.
    #[default]
    Text,
    /// One JSON object on stdout.
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = cli.dispatch() {
        eprintln!("tkey-random: {e:#}");
        std::process::exit(1);
    }
}

/// Logs to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl Cli {
    fn dispatch(self) -> Result<()> {
        if let Some(shell) = self.completion {
            clap_complete::generate(
                shell,
                &mut Self::command(),
                "tkey-random",
                &mut std::io::stdout(),
            );
            return Ok(());
        }
        let port = self
            .port
            .ok_or_else(|| anyhow::anyhow!("no serial port given (use --port or TKEY_PORT)"))?;
        run::run(&run::RunArgs {
            port,
            speed: self.speed,
            bytes: self.bytes,
            format: self.format,
        })
    }
}
