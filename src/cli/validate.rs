// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Validate command - check a pipeline definition

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::load_definition;
use crate::pipeline::SegmentDag;
use crate::utils::{print_error, print_header, print_section, print_success, print_suggestion, print_warning};

/// Run the validate command
pub async fn run(pipeline_path: Option<PathBuf>, verbose: bool) -> Result<()> {
    print_header("Validating pipeline...");

    let (path, definition) = match load_definition(pipeline_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            print_error("Failed to load pipeline definition");
            return Err(e);
        }
    };
    print_success(&format!("Parsed {}", path.display()));

    let (assembler, groups) = match definition.assembler() {
        Ok(built) => built,
        Err(e) => {
            print_error("Failed to register segments");
            print_suggestion(&e);
            return Err(e.into());
        }
    };
    print_success(&format!(
        "Registered {} segments across {} stages",
        definition.segment_count(),
        groups.len()
    ));

    let report = match assembler.validate(&groups) {
        Ok(report) => report,
        Err(e) => {
            print_error("Stage layout is invalid");
            print_suggestion(&e);
            return Err(e.into());
        }
    };
    print_success("Stage layout is valid");

    let mut warnings = report.warnings;
    if let Err(e) = SegmentDag::build(assembler.graph()).topological_order() {
        warnings.push(e.to_string());
    }

    if !warnings.is_empty() {
        print_section("Warnings");
        for warning in &warnings {
            print_warning(warning);
        }
    }

    if verbose {
        let graph = assembler.graph();
        print_section("Pipeline summary");
        println!("  Name: {}", definition.name);
        println!("  Build directory: {}", assembler.context().build_dir().display());
        println!("  Stages: {}", groups.len());
        for (position, group) in groups.iter().enumerate() {
            let labels: Vec<String> = group
                .segments
                .iter()
                .map(|id| graph.segment_label(*id))
                .collect();
            let name = group.name.clone().unwrap_or_else(|| format!("#{}", position));
            println!("    - {} {}", name, format!("[{}]", labels.join(", ")).dimmed());
        }
    }

    println!();
    if warnings.is_empty() {
        println!("{}", "Pipeline is valid!".green().bold());
    } else {
        println!("{}", "Pipeline is valid but has warnings.".yellow().bold());
    }

    Ok(())
}
