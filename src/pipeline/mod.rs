// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Pipeline assembly
//!
//! Everything between a registered artifact graph and the final plan:
//! the pipeline context, segment groups, validation, the assembler, the
//! dependency view and the declarative definition format.

mod assembled;
mod assembler;
mod context;
mod dag;
mod definition;
mod group;
mod validation;

pub use assembled::{AssembledPipeline, AssembledStage};
pub use assembler::{Assembler, PIPELINE_STAGE, SOURCE_STAGE};
pub use context::PipelineContext;
pub use dag::SegmentDag;
pub use definition::{
    PipelineDefinition, SegmentDefinition, StageDefinition, ARTIFACT_NAME_PATTERN,
    DEFAULT_DEFINITION, DEFINITION_CANDIDATES,
};
pub use group::SegmentGroup;
pub use validation::{AssemblyValidator, ValidationReport, SELF_UPDATE_POSITION, SOURCE_POSITION};
