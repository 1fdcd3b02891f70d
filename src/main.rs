// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use photobooth::constants::app_info;
use photobooth::gallery::GridTemplate;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Photo booth: countdown, filters, collages, stickers and captions")]
#[command(version = app_info::version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List {
        /// List the virtual cameras instead of the configured backend
        #[arg(long = "virtual")]
        use_virtual: bool,
    },

    /// Run one capture cycle and export the composite
    Shoot(cli::ShootArgs),

    /// Arrange image files on a grid
    Collage {
        /// Grid template: 1x2, 2x2, 3x3, vertical, horizontal
        #[arg(short, long, default_value = "2x2")]
        template: GridTemplate,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        /// Images, in grid order
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG to control the log level, e.g. RUST_LOG=photobooth=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { use_virtual } => cli::list_cameras(use_virtual),
        Commands::Shoot(args) => cli::shoot(args),
        Commands::Collage {
            template,
            output,
            images,
        } => cli::collage(template, &output, &images),
    }
}
