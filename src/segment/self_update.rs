// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Self-update segment
//!
//! Re-synthesizes the pipeline definition from source so the pipeline
//! updates itself before deploying anything else.

use super::{BuildConfig, ConstructedSegment, ExpansionContext};
use crate::artifact::ArtifactId;
use crate::providers::BuildRequest;

/// Action name of the single self-update step
pub const UPDATE_ACTION: &str = "UpdatePipeline";

/// Segment rebuilding the pipeline's own definition
#[derive(Debug, Clone, PartialEq)]
pub struct SelfUpdateSegment {
    pub input: ArtifactId,
    pub extra_inputs: Vec<ArtifactId>,
    /// Synthesized output consumed by later stages
    pub output: Option<ArtifactId>,
    pub build: BuildConfig,
}

impl SelfUpdateSegment {
    pub fn new(input: ArtifactId, build: BuildConfig) -> Self {
        Self {
            input,
            extra_inputs: Vec::new(),
            output: None,
            build,
        }
    }

    pub fn extra_inputs(mut self, extra_inputs: Vec<ArtifactId>) -> Self {
        self.extra_inputs = extra_inputs;
        self
    }

    pub fn output(mut self, output: ArtifactId) -> Self {
        self.output = Some(output);
        self
    }

    pub(crate) fn expand(&self, ctx: &ExpansionContext<'_>) -> ConstructedSegment {
        let name = ctx.pipeline.pipeline_name.clone();
        let extra_inputs: Vec<String> = self
            .extra_inputs
            .iter()
            .map(|id| ctx.graph.artifact_name(*id))
            .collect();
        let outputs: Vec<String> = self
            .output
            .iter()
            .map(|id| ctx.graph.artifact_name(*id))
            .collect();

        let action = ctx.providers.build.build(&BuildRequest {
            action_name: UPDATE_ACTION,
            project_name: &format!("{}{}", name, UPDATE_ACTION),
            config: &self.build,
            input: &ctx.graph.artifact_name(self.input),
            extra_inputs: &extra_inputs,
            outputs: &outputs,
            build_dir: &ctx.pipeline.build_dir_string(),
        });

        ConstructedSegment {
            name,
            actions: vec![action.with_run_order(1)],
        }
    }
}
