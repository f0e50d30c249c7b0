// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Init command - create a starter pipeline definition

use colored::Colorize;
use miette::Result;
use std::path::Path;

use crate::errors::SegpipeError;
use crate::pipeline::DEFAULT_DEFINITION;
use crate::utils::{code, print_header, print_success};

/// Run the init command
pub async fn run(name: Option<String>, force: bool, verbose: bool) -> Result<()> {
    let raw_name = name.unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|s| s.to_string_lossy().to_string()))
            .unwrap_or_else(|| "delivery".to_string())
    });
    let pipeline_name = sanitize_name(&raw_name);

    print_header("Initializing segpipe pipeline...");

    let path = Path::new(DEFAULT_DEFINITION);
    if path.exists() && !force {
        return Err(miette::miette!(
            "{} already exists. Use --force to overwrite.",
            DEFAULT_DEFINITION
        ));
    }

    let content = generate_default_template(&pipeline_name);
    std::fs::write(path, &content).map_err(|e| SegpipeError::FileWriteError {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    print_success(&format!("Created {}", DEFAULT_DEFINITION));

    println!();
    println!("{}", "Pipeline initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to describe your source and stacks", code(DEFAULT_DEFINITION));
    println!("  2. Run {} to check the stage layout", code("segpipe validate"));
    println!("  3. Run {} to see the assembled plan", code("segpipe plan"));
    println!();

    if verbose {
        println!("{}", "Generated definition:".dimmed());
        println!("{}", "─".repeat(50).dimmed());
        println!("{}", content.dimmed());
    }

    Ok(())
}

/// Keep a name usable as a pipeline, repository and stack name
fn sanitize_name(raw: &str) -> String {
    let name: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect::<String>()
        .trim_matches('-')
        .to_string();

    if name.is_empty() {
        "delivery".to_string()
    } else {
        name
    }
}

fn generate_default_template(name: &str) -> String {
    format!(
        r#"# segpipe pipeline definition
#
# Stage 1 fetches sources, stage 2 updates the pipeline itself,
# every later stage deploys stacks.

name: "{name}"
root_dir: .
out_dir: cdk.out
# account: "123456789012"
# region: eu-central-1

artifacts:
  - Source
  - Synth

stages:
  - segments:
      - type: code_commit_source
        repository: "{name}"
        branch: main
        output: Source

  - segments:
      - type: self_update
        input: Source
        output: Synth
        build:
          build_spec:
            version: "0.2"
            phases:
              install:
                commands:
                  - npm ci
              build:
                commands:
                  - npx cdk synth

  - segments:
      - type: stack
        name: "{name}-stack"
        input: Synth
        manual_approval: true

# Build assets before deploying:
#       - type: stack
#         name: {name}-api
#         input: Synth
#         build:
#           compute_type: medium
"#
    )
}
