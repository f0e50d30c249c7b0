// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Error types for pipeline assembly
//!
//! Every assembly error is a definition-time mistake in the pipeline the
//! caller described. Nothing here is retryable: assembly aborts on the
//! first error and no partial pipeline is returned.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for segpipe operations
pub type SegpipeResult<T> = Result<T, SegpipeError>;

/// Main error type for segpipe
#[derive(Error, Debug, Diagnostic, PartialEq, Eq)]
pub enum SegpipeError {
    // ─────────────────────────────────────────────────────────────────────────
    // Artifact Graph Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Artifact '{artifact}' is already produced by '{producer}'")]
    #[diagnostic(
        code(segpipe::already_produced),
        help("An artifact can have only one producer. Declare a separate artifact for '{segment}'")
    )]
    AlreadyProduced {
        artifact: String,
        producer: String,
        segment: String,
    },

    #[error("Segment '{segment}' consumes artifact '{artifact}' which is never produced")]
    #[diagnostic(
        code(segpipe::dangling_artifact),
        help("Bind '{artifact}' as the output of a segment placed in the pipeline")
    )]
    DanglingArtifact { segment: String, artifact: String },

    #[error("Artifact #{id} is not declared in this pipeline")]
    #[diagnostic(
        code(segpipe::unknown_artifact),
        help("Declare artifacts through the same graph the segment is added to")
    )]
    UnknownArtifact { id: u32 },

    #[error("Segment #{id} is not registered in this pipeline")]
    #[diagnostic(code(segpipe::unknown_segment))]
    UnknownSegment { id: u32 },

    #[error("Circular dependency detected")]
    #[diagnostic(
        code(segpipe::circular_dependency),
        help("Review which segments consume each other's artifacts")
    )]
    CircularDependency { segments: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────
    // Placement Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Pipeline has no stages")]
    #[diagnostic(
        code(segpipe::empty_pipeline),
        help("A pipeline needs a source stage followed by the self-update stage")
    )]
    EmptyPipeline,

    #[error("Stage at position {position} has no segments")]
    #[diagnostic(code(segpipe::empty_stage))]
    EmptyStage { position: usize },

    #[error("Segment '{segment}' is placed more than once")]
    #[diagnostic(
        code(segpipe::duplicate_placement),
        help("Each segment is expanded exactly once; construct a second segment instead")
    )]
    DuplicatePlacement { segment: String },

    #[error("Stages {first} and {second} are both named '{name}'")]
    #[diagnostic(
        code(segpipe::duplicate_stage_name),
        help("Stage names must be unique; give one of the stages an explicit name")
    )]
    DuplicateStageName {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("Segment '{segment}' is misplaced at stage {position}: {reason}")]
    #[diagnostic(
        code(segpipe::misplaced_source),
        help("The first stage must contain only source segments, and source segments may only appear there")
    )]
    MisplacedSource {
        segment: String,
        position: usize,
        reason: String,
    },

    #[error("Pipeline has no self-update segment")]
    #[diagnostic(
        code(segpipe::missing_self_update),
        help("Place exactly one self-update segment, alone, in the second stage")
    )]
    MissingSelfUpdate,

    #[error("Pipeline has {count} self-update segments: {}", .segments.join(", "))]
    #[diagnostic(
        code(segpipe::duplicate_self_update),
        help("Only one self-update segment may exist in a pipeline")
    )]
    DuplicateSelfUpdate { count: usize, segments: Vec<String> },

    #[error("Self-update segment '{segment}' is misplaced at stage {position}: {reason}")]
    #[diagnostic(
        code(segpipe::misplaced_self_update),
        help("The self-update segment must be the sole member of the second stage")
    )]
    MisplacedSelfUpdate {
        segment: String,
        position: usize,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Definition Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Pipeline definition not found: {path}")]
    #[diagnostic(
        code(segpipe::definition_not_found),
        help("Create a definition with 'segpipe init' or write .segpipe.yaml manually")
    )]
    DefinitionNotFound { path: PathBuf },

    #[error("Invalid pipeline definition: {reason}")]
    #[diagnostic(code(segpipe::invalid_definition))]
    InvalidDefinition {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Artifact '{name}' is referenced but not declared")]
    #[diagnostic(
        code(segpipe::undeclared_artifact),
        help("Add '{name}' to the top-level 'artifacts' list")
    )]
    UndeclaredArtifact { name: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/Format Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(segpipe::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(segpipe::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(segpipe::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(segpipe::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(segpipe::json_error))]
    Json { message: String },

    #[error("TOML parsing error: {message}")]
    #[diagnostic(code(segpipe::toml_error))]
    Toml { message: String },
}

impl From<std::io::Error> for SegpipeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for SegpipeError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for SegpipeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<toml::de::Error> for SegpipeError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml { message: e.to_string() }
    }
}

impl SegpipeError {
    /// Whether this error comes from the structural checks of `assemble`
    pub fn is_placement_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyPipeline
                | Self::EmptyStage { .. }
                | Self::DuplicatePlacement { .. }
                | Self::DuplicateStageName { .. }
                | Self::MisplacedSource { .. }
                | Self::MissingSelfUpdate
                | Self::DuplicateSelfUpdate { .. }
                | Self::MisplacedSelfUpdate { .. }
        )
    }

    /// Concrete fix steps for this error, where there are any
    pub fn suggestion(&self) -> Option<RecoverySuggestion> {
        match self {
            Self::AlreadyProduced { artifact, .. } => {
                Some(RecoverySuggestion::split_artifact(artifact))
            }
            Self::DanglingArtifact { segment, artifact } => {
                Some(RecoverySuggestion::produce_artifact(segment, artifact))
            }
            Self::MisplacedSource { segment, .. } => {
                Some(RecoverySuggestion::move_source(segment))
            }
            Self::MissingSelfUpdate => Some(RecoverySuggestion::add_self_update()),
            Self::DuplicateSelfUpdate { segments, .. } => {
                Some(RecoverySuggestion::remove_extra_self_updates(segments))
            }
            Self::MisplacedSelfUpdate { segment, .. } => {
                Some(RecoverySuggestion::move_self_update(segment))
            }
            Self::DuplicateStageName { name, .. } => Some(RecoverySuggestion::rename_stage(name)),
            Self::UndeclaredArtifact { name } => Some(RecoverySuggestion::declare_artifact(name)),
            _ => None,
        }
    }
}
