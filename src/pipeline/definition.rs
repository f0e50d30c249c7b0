// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Declarative pipeline definitions
//!
//! A definition file names the artifacts up front and lists stages of
//! segments that refer to them by name. Building a definition registers
//! every segment with a fresh [`ArtifactGraph`] in declaration order.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{AssembledPipeline, Assembler, PipelineContext, SegmentGroup};
use crate::artifact::{build_artifact_name, ArtifactGraph, ArtifactId};
use crate::errors::{SegpipeError, SegpipeResult};
use crate::segment::{
    BuildConfig, CodeCommitRepository, CodeStarConnection, GenericSegment, GitHubRepository,
    S3Location, Segment, SelfUpdateSegment, SourceRepository, SourceSegment, StackTarget,
};

/// Definition file looked up when none is given
pub const DEFAULT_DEFINITION: &str = ".segpipe.yaml";

/// File names tried, in order, when searching a directory
pub const DEFINITION_CANDIDATES: [&str; 4] = [
    ".segpipe.yaml",
    ".segpipe.yml",
    ".segpipe.json",
    ".segpipe.toml",
];

/// Allowed artifact names
pub const ARTIFACT_NAME_PATTERN: &str = "^[A-Za-z0-9_-]{1,100}$";

/// Top-level pipeline definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Pipeline name
    pub name: String,

    /// Project root inside the source artifact
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Synthesis output directory, relative to `root_dir`
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Default deployment account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Default deployment region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Artifact names, declared before use
    #[serde(default)]
    pub artifacts: Vec<String>,

    /// Stages in pipeline order
    #[serde(default)]
    pub stages: Vec<StageDefinition>,
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("cdk.out")
}

/// One stage of the definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Explicit stage name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub segments: Vec<SegmentDefinition>,
}

/// A segment as written in a definition file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentDefinition {
    CodeStarSource {
        #[serde(flatten)]
        connection: CodeStarConnection,
        output: String,
    },
    GitHubSource {
        #[serde(flatten)]
        repository: GitHubRepository,
        output: String,
    },
    CodeCommitSource {
        #[serde(flatten)]
        repository: CodeCommitRepository,
        output: String,
    },
    S3Source {
        #[serde(flatten)]
        location: S3Location,
        output: String,
    },
    SelfUpdate {
        input: String,
        #[serde(default)]
        extra_inputs: Vec<String>,
        #[serde(default)]
        output: Option<String>,
        #[serde(default)]
        build: BuildConfig,
    },
    Stack {
        #[serde(flatten)]
        stack: StackTarget,
        input: String,
        #[serde(default)]
        extra_inputs: Vec<String>,
        #[serde(default)]
        build: Option<BuildConfig>,
        /// Deploy to this stack name instead of the target's name
        #[serde(default)]
        stack_name: Option<String>,
        #[serde(default)]
        output: Option<String>,
        #[serde(default)]
        output_file_name: Option<String>,
        #[serde(default)]
        manual_approval: bool,
    },
}

impl SegmentDefinition {
    /// Resolve artifact names and build the segment
    fn to_segment(&self, artifacts: &BTreeMap<String, ArtifactId>) -> SegpipeResult<Segment> {
        let resolve = |name: &str| {
            artifacts
                .get(name)
                .copied()
                .ok_or_else(|| SegpipeError::UndeclaredArtifact {
                    name: name.to_string(),
                })
        };
        let resolve_all = |names: &[String]| {
            names
                .iter()
                .map(|name| resolve(name))
                .collect::<SegpipeResult<Vec<_>>>()
        };

        let segment: Segment = match self {
            Self::CodeStarSource { connection, output } => SourceSegment::new(
                SourceRepository::CodeStar(connection.clone()),
                resolve(output)?,
            )
            .into(),
            Self::GitHubSource { repository, output } => SourceSegment::new(
                SourceRepository::GitHub(repository.clone()),
                resolve(output)?,
            )
            .into(),
            Self::CodeCommitSource { repository, output } => SourceSegment::new(
                SourceRepository::CodeCommit(repository.clone()),
                resolve(output)?,
            )
            .into(),
            Self::S3Source { location, output } => {
                SourceSegment::new(SourceRepository::S3(location.clone()), resolve(output)?).into()
            }
            Self::SelfUpdate {
                input,
                extra_inputs,
                output,
                build,
            } => {
                let mut segment = SelfUpdateSegment::new(resolve(input)?, build.clone())
                    .extra_inputs(resolve_all(extra_inputs)?);
                if let Some(output) = output {
                    segment = segment.output(resolve(output)?);
                }
                segment.into()
            }
            Self::Stack {
                stack,
                input,
                extra_inputs,
                build,
                stack_name,
                output,
                output_file_name,
                manual_approval,
            } => {
                let mut segment = GenericSegment::new(stack.clone(), resolve(input)?)
                    .extra_inputs(resolve_all(extra_inputs)?)
                    .manual_approval(*manual_approval);
                if let Some(build) = build {
                    segment = segment.build(build.clone());
                }
                if let Some(stack_name) = stack_name {
                    segment = segment.stack_name(stack_name.as_str());
                }
                if let Some(output) = output {
                    segment = segment.output(resolve(output)?);
                }
                if let Some(file_name) = output_file_name {
                    segment = segment.output_file_name(file_name.as_str());
                }
                segment.into()
            }
        };

        Ok(segment)
    }
}

impl PipelineDefinition {
    /// Load a definition, choosing the format from the file extension
    pub fn from_file(path: &Path) -> SegpipeResult<Self> {
        if !path.exists() {
            return Err(SegpipeError::DefinitionNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SegpipeError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("toml") => Self::from_toml(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Find a definition file in `dir`
    pub fn find_in(dir: &Path) -> SegpipeResult<PathBuf> {
        DEFINITION_CANDIDATES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
            .ok_or_else(|| SegpipeError::DefinitionNotFound {
                path: dir.join(DEFAULT_DEFINITION),
            })
    }

    pub fn from_yaml(yaml: &str) -> SegpipeResult<Self> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    pub fn from_json(json: &str) -> SegpipeResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    pub fn from_toml(toml: &str) -> SegpipeResult<Self> {
        toml::from_str(toml).map_err(Into::into)
    }

    pub fn to_yaml(&self) -> SegpipeResult<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Pipeline-wide settings for expansion
    pub fn context(&self) -> PipelineContext {
        let mut context = PipelineContext::new(self.name.as_str())
            .with_root_dir(self.root_dir.clone())
            .with_out_dir(self.out_dir.clone());
        context.account = self.account.clone();
        context.region = self.region.clone();
        context
    }

    /// Number of segments across all stages
    pub fn segment_count(&self) -> usize {
        self.stages.iter().map(|s| s.segments.len()).sum()
    }

    /// Check the pipeline name and artifact declarations
    fn check_declarations(&self) -> SegpipeResult<()> {
        if self.name.trim().is_empty() {
            return Err(SegpipeError::InvalidDefinition {
                reason: "pipeline name is empty".into(),
                help: Some("Set a top-level 'name'".into()),
            });
        }

        let pattern = Regex::new(ARTIFACT_NAME_PATTERN).map_err(|e| {
            SegpipeError::InvalidDefinition {
                reason: e.to_string(),
                help: None,
            }
        })?;

        let mut seen = BTreeMap::new();
        for (i, name) in self.artifacts.iter().enumerate() {
            if !pattern.is_match(name) {
                return Err(SegpipeError::InvalidDefinition {
                    reason: format!("artifact name '{}' is not allowed", name),
                    help: Some(
                        "Use 1 to 100 letters, digits, '_' or '-' for artifact names".into(),
                    ),
                });
            }
            if let Some(first) = seen.insert(name.as_str(), i) {
                return Err(SegpipeError::InvalidDefinition {
                    reason: format!(
                        "artifact '{}' is declared twice (entries {} and {})",
                        name,
                        first + 1,
                        i + 1
                    ),
                    help: Some("Artifact names must be unique".into()),
                });
            }
        }

        let generated = self
            .stages
            .iter()
            .flat_map(|stage| &stage.segments)
            .filter_map(|segment| match segment {
                SegmentDefinition::Stack {
                    stack,
                    build: Some(_),
                    ..
                } => Some(build_artifact_name(&stack.name)),
                _ => None,
            });
        for name in generated {
            if seen.contains_key(name.as_str()) {
                return Err(SegpipeError::InvalidDefinition {
                    reason: format!(
                        "artifact '{}' clashes with the build output of stack '{}'",
                        name,
                        name.trim_end_matches("Build")
                    ),
                    help: Some("Rename the declared artifact".into()),
                });
            }
        }

        Ok(())
    }

    /// Register every artifact and segment in declaration order
    pub fn build(&self) -> SegpipeResult<(PipelineContext, ArtifactGraph, Vec<SegmentGroup>)> {
        self.check_declarations()?;

        let mut graph = ArtifactGraph::new();
        let artifacts: BTreeMap<String, ArtifactId> = self
            .artifacts
            .iter()
            .map(|name| (name.clone(), graph.artifact(Some(name))))
            .collect();

        let mut groups = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let mut segments = Vec::with_capacity(stage.segments.len());
            for definition in &stage.segments {
                let segment = definition.to_segment(&artifacts)?;
                segments.push(graph.add_segment(segment)?);
            }
            groups.push(SegmentGroup {
                name: stage.name.clone(),
                segments,
            });
        }

        debug!(
            pipeline = %self.name,
            artifacts = artifacts.len(),
            stages = groups.len(),
            "Built pipeline definition"
        );

        Ok((self.context(), graph, groups))
    }

    /// Build an assembler and the stage layout
    pub fn assembler(&self) -> SegpipeResult<(Assembler, Vec<SegmentGroup>)> {
        let (context, graph, groups) = self.build()?;
        Ok((Assembler::new(context, graph), groups))
    }

    /// Build and assemble the pipeline
    pub fn assemble(&self) -> SegpipeResult<AssembledPipeline> {
        let (assembler, groups) = self.assembler()?;
        assembler.assemble(&groups)
    }
}
