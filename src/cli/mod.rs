// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for segpipe.

pub mod graph;
pub mod init;
pub mod plan;
pub mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::PipelineDefinition;

/// Deployment pipeline assembler
///
/// Validate a pipeline definition and turn it into an ordered plan.
#[derive(Parser, Debug)]
#[clap(
    name = "segpipe",
    version,
    about = "Assemble validated deployment pipelines from declarative segments",
    long_about = None,
    after_help = "Examples:\n\
        segpipe init                    Create a starter .segpipe.yaml\n\
        segpipe validate                Check the pipeline definition\n\
        segpipe plan --format json      Print the assembled plan\n\
        segpipe graph --format mermaid  Show segment dependencies\n\n\
        See 'segpipe <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a starter pipeline definition
    Init {
        /// Pipeline name (defaults to current directory name)
        name: Option<String>,

        /// Overwrite an existing definition
        #[clap(short, long)]
        force: bool,
    },

    /// Validate the pipeline definition
    Validate {
        /// Definition file (searched in the current directory by default)
        pipeline: Option<PathBuf>,
    },

    /// Assemble the pipeline and print the plan
    Plan {
        /// Definition file (searched in the current directory by default)
        pipeline: Option<PathBuf>,

        /// Output format (text, json, yaml)
        #[clap(short, long, default_value = "text")]
        format: PlanFormat,

        /// Write the plan to a file instead of stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Show segment dependencies as a graph
    Graph {
        /// Definition file (searched in the current directory by default)
        pipeline: Option<PathBuf>,

        /// Output format (text, dot, mermaid)
        #[clap(short, long, default_value = "text")]
        format: GraphFormat,
    },
}

/// Output format for the plan command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for PlanFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(format!("Unknown plan format: {}", s)),
        }
    }
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

impl std::str::FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "dot" => Ok(Self::Dot),
            "mermaid" => Ok(Self::Mermaid),
            _ => Err(format!("Unknown graph format: {}", s)),
        }
    }
}

/// Load the definition at `path`, or the first one found in the current directory
pub(crate) fn load_definition(
    path: Option<PathBuf>,
) -> miette::Result<(PathBuf, PipelineDefinition)> {
    let path = match path {
        Some(path) => path,
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;
            PipelineDefinition::find_in(&cwd)?
        }
    };

    let definition = PipelineDefinition::from_file(&path)?;
    Ok((path, definition))
}
