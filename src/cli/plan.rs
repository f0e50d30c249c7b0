// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Plan command - assemble the pipeline and print it

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;
use tracing::info;

use super::{load_definition, PlanFormat};
use crate::errors::SegpipeError;
use crate::utils::{print_error, print_info, print_success, print_suggestion};

/// Run the plan command
pub async fn run(
    pipeline_path: Option<PathBuf>,
    format: PlanFormat,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let (path, definition) = load_definition(pipeline_path)?;
    info!(path = %path.display(), "Loaded pipeline definition");

    let pipeline = match definition.assemble() {
        Ok(pipeline) => pipeline,
        Err(e) => {
            print_error("Pipeline could not be assembled");
            print_suggestion(&e);
            return Err(e.into());
        }
    };

    let rendered = match format {
        PlanFormat::Text => pipeline.to_text(),
        PlanFormat::Json => pipeline.to_json()?,
        PlanFormat::Yaml => pipeline.to_yaml()?,
    };

    match output {
        Some(target) => {
            std::fs::write(&target, &rendered).map_err(|e| SegpipeError::FileWriteError {
                path: target.clone(),
                error: e.to_string(),
            })?;
            print_success(&format!(
                "Wrote {} stages and {} actions to {}",
                pipeline.stages.len(),
                pipeline.action_count(),
                target.display()
            ));
        }
        None => print!("{}", rendered),
    }

    // Structured output stays alone on stdout
    let fingerprint = format!("Fingerprint: {}", pipeline.fingerprint()?.dimmed());
    if format == PlanFormat::Text {
        println!();
        print_info(&fingerprint);
    } else if verbose {
        eprintln!("  {} {}", "→".blue(), fingerprint);
    }

    Ok(())
}
