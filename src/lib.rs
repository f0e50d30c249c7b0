// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! # segpipe - Deployment Pipeline Assembler
//!
//! `segpipe` assembles a multi-stage deployment pipeline from segments
//! wired together by artifacts, validates where each kind of segment may
//! appear, and expands every segment into ordered actions.
//!
//! ## Features
//!
//! - **Artifact graph** - Single producer, many consumers, checked at registration
//! - **Placement rules** - Sources first, exactly one self-update second
//! - **Deterministic plans** - Same definition, same stages, same fingerprint
//! - **Pluggable providers** - Swap the source, build, deployment and approval actions
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a starter definition
//! segpipe init
//!
//! # Check the stage layout
//! segpipe validate
//!
//! # Print the assembled plan
//! segpipe plan --format yaml
//! ```

pub mod action;
pub mod artifact;
pub mod cli;
pub mod errors;
pub mod pipeline;
pub mod providers;
pub mod segment;
pub mod utils;

// Re-export commonly used types
pub use action::{Action, ActionCategory};
pub use artifact::{ArtifactGraph, ArtifactId, SegmentId};
pub use errors::{SegpipeError, SegpipeResult};
pub use pipeline::{
    AssembledPipeline, AssembledStage, Assembler, PipelineContext, PipelineDefinition,
    SegmentGroup,
};
pub use segment::{GenericSegment, Segment, SegmentKind, SelfUpdateSegment, SourceSegment};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
