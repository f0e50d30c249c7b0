// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! segpipe - Deployment Pipeline Assembler
//!
//! Validate pipeline definitions and assemble them into ordered plans.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use segpipe::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "segpipe=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    segpipe::utils::apply_color_preference();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Init { name, force } => segpipe::cli::init::run(name, force, cli.verbose).await,
        Commands::Validate { pipeline } => {
            segpipe::cli::validate::run(pipeline, cli.verbose).await
        }
        Commands::Plan {
            pipeline,
            format,
            output,
        } => segpipe::cli::plan::run(pipeline, format, output, cli.verbose).await,
        Commands::Graph { pipeline, format } => {
            segpipe::cli::graph::run(pipeline, format, cli.verbose).await
        }
    }
}
