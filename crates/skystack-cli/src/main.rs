mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skystack", about = "Deep-sky frame calibration and stacking tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calibrate, filter and compose registered frames
    Stack(commands::stack::StackArgs),
    /// Print per-channel background and maximum of an image
    Background(commands::background::BackgroundArgs),
    /// Print the square-tile entropy map of an image
    Entropy(commands::entropy::EntropyArgs),
    /// Median filter an image
    Median(commands::median::MedianArgs),
    /// Print or save the default stacking config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Stack(args) => commands::stack::run(args),
        Commands::Background(args) => commands::background::run(args),
        Commands::Entropy(args) => commands::entropy::run(args),
        Commands::Median(args) => commands::median::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
