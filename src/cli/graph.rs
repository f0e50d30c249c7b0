// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Graph command - visualize segment dependencies

use miette::Result;
use std::path::PathBuf;

use super::{load_definition, GraphFormat};
use crate::pipeline::SegmentDag;

/// Run the graph command
pub async fn run(pipeline_path: Option<PathBuf>, format: GraphFormat, _verbose: bool) -> Result<()> {
    let (_, definition) = load_definition(pipeline_path)?;
    let (_, graph, _) = definition.build()?;

    let dag = SegmentDag::build(&graph);

    let output = match format {
        GraphFormat::Text => dag.to_text()?,
        GraphFormat::Dot => dag.to_dot(),
        GraphFormat::Mermaid => dag.to_mermaid(),
    };

    println!("{}", output);

    Ok(())
}
