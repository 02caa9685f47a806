//! BRISQUE CLI - no-reference image quality scoring
//!
//! Command-line interface for the BRISQUE feature extractor and scorer.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::ThreadPoolBuilder;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::features::FeaturesCommand;
use commands::score::ScoreCommand;

#[derive(Parser)]
#[command(
    name = "brisque",
    version,
    about = "Blind/referenceless image quality scoring",
    long_about = "Score the perceived quality of images with BRISQUE.\n\
                  Lower scores indicate better quality.",
    after_help = "EXAMPLES:\n  \
                  # Score images with the reference model\n  \
                  brisque score --model brisque_allmodel.dat --range brisque_allrange.dat a.png b.jpg\n\n  \
                  # Use BRISQUE_DATA_DIR for the model and range files\n  \
                  BRISQUE_DATA_DIR=./data brisque score photo.jpg\n\n  \
                  # Mean score over video frames\n  \
                  brisque score --average --format json frames/*.png\n\n  \
                  # Dump the 36 features of one image\n  \
                  brisque features photo.jpg"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one or more images
    Score(ScoreCommand),

    /// Print the feature vector of one image
    Features(FeaturesCommand),
}

/// Output format shared by all commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    // BRISQUE_THREADS caps the global rayon pool
    if let Ok(threads_str) = std::env::var("BRISQUE_THREADS") {
        if let Ok(num_threads) = threads_str.parse::<usize>() {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .ok();
        }
    }

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Score(cmd) => cmd.execute(),
        Commands::Features(cmd) => cmd.execute(),
    }
}
