mod codec;
mod encode;
mod io;
mod multi;
mod report;
mod sample;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "downsample",
    about = "Shape-preserving time-series downsampling for charts"
)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Downsample one series with largest-triangle-three-buckets
    Lttb(sample::Opts),
    /// Downsample one series keeping per-bucket minima and maxima
    Minmax(sample::MinMaxOpts),
    /// Downsample several related series onto a shared timestamp grid
    Multi(multi::Opts),
    /// Transcode samples between encodings
    Encode(encode::Opts),
    /// Summarize inputs and what each sampler would keep
    Report(report::Opts),
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Lttb(opts) => sample::lttb(&opts).await,
        Command::Minmax(opts) => sample::min_max(&opts).await,
        Command::Multi(opts) => multi::multi(&opts).await,
        Command::Encode(opts) => encode::encode(&opts).await,
        Command::Report(opts) => report::report(&opts).await,
    }
}
