// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Source segments
//!
//! A source segment fetches code or an archive from outside the pipeline
//! and produces exactly one artifact. Its name is derived from the
//! repository identity so several sources in the first stage stay
//! distinguishable.

use serde::{Deserialize, Serialize};

use super::{ConstructedSegment, ExpansionContext};
use crate::artifact::ArtifactId;
use crate::providers::SourceRequest;

fn default_branch() -> String {
    "master".to_string()
}

fn default_true() -> bool {
    true
}

/// How a source notices new revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTrigger {
    /// Only run when started manually
    None,
    /// The orchestrator polls for changes
    Poll,
    /// Change events (webhooks, event rules) start the pipeline
    Events,
}

fn events_trigger() -> SourceTrigger {
    SourceTrigger::Events
}

fn poll_trigger() -> SourceTrigger {
    SourceTrigger::Poll
}

/// Repository reached through a CodeStar connection (GitHub, Bitbucket, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeStarConnection {
    pub connection_arn: String,
    pub owner: String,
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_true")]
    pub trigger_on_push: bool,
    #[serde(default)]
    pub variables_namespace: Option<String>,
}

/// GitHub repository accessed with an OAuth token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubRepository {
    pub owner: String,
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Name of the secret holding the token, never the token itself
    pub oauth_secret: String,
    #[serde(default = "events_trigger")]
    pub trigger: SourceTrigger,
    #[serde(default)]
    pub variables_namespace: Option<String>,
}

/// CodeCommit repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeCommitRepository {
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "events_trigger")]
    pub trigger: SourceTrigger,
    #[serde(default)]
    pub variables_namespace: Option<String>,
}

/// Object in an S3 bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
    #[serde(default = "poll_trigger")]
    pub trigger: SourceTrigger,
    #[serde(default)]
    pub variables_namespace: Option<String>,
}

/// Where a source segment fetches from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRepository {
    CodeStar(CodeStarConnection),
    GitHub(GitHubRepository),
    CodeCommit(CodeCommitRepository),
    S3(S3Location),
}

impl SourceRepository {
    pub fn code_star(
        connection_arn: impl Into<String>,
        owner: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        Self::CodeStar(CodeStarConnection {
            connection_arn: connection_arn.into(),
            owner: owner.into(),
            repository: repository.into(),
            branch: default_branch(),
            trigger_on_push: true,
            variables_namespace: None,
        })
    }

    pub fn github(
        owner: impl Into<String>,
        repository: impl Into<String>,
        oauth_secret: impl Into<String>,
    ) -> Self {
        Self::GitHub(GitHubRepository {
            owner: owner.into(),
            repository: repository.into(),
            branch: default_branch(),
            oauth_secret: oauth_secret.into(),
            trigger: events_trigger(),
            variables_namespace: None,
        })
    }

    pub fn code_commit(repository: impl Into<String>) -> Self {
        Self::CodeCommit(CodeCommitRepository {
            repository: repository.into(),
            branch: default_branch(),
            trigger: events_trigger(),
            variables_namespace: None,
        })
    }

    pub fn s3(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::S3(S3Location {
            bucket: bucket.into(),
            key: key.into(),
            trigger: poll_trigger(),
            variables_namespace: None,
        })
    }

    /// Set the branch; S3 locations have none and are returned unchanged
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        match &mut self {
            Self::CodeStar(c) => c.branch = branch.into(),
            Self::GitHub(g) => g.branch = branch.into(),
            Self::CodeCommit(c) => c.branch = branch.into(),
            Self::S3(_) => {}
        }
        self
    }

    /// Name derived from the repository identity
    pub fn derived_name(&self) -> String {
        match self {
            Self::CodeStar(c) => format!("{}/{}/{}", c.owner, c.repository, c.branch),
            Self::GitHub(g) => format!("{}-{}-{}", g.owner, g.repository, g.branch),
            Self::CodeCommit(c) => format!("{}-{}", c.repository, c.branch),
            Self::S3(s) => format!("{}-{}", s.bucket, s.key),
        }
    }

    pub fn variables_namespace(&self) -> Option<&str> {
        match self {
            Self::CodeStar(c) => c.variables_namespace.as_deref(),
            Self::GitHub(g) => g.variables_namespace.as_deref(),
            Self::CodeCommit(c) => c.variables_namespace.as_deref(),
            Self::S3(s) => s.variables_namespace.as_deref(),
        }
    }
}

/// Segment fetching a repository into its single output artifact
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSegment {
    pub repository: SourceRepository,
    pub output: ArtifactId,
}

impl SourceSegment {
    pub fn new(repository: SourceRepository, output: ArtifactId) -> Self {
        Self { repository, output }
    }

    pub fn name(&self) -> String {
        self.repository.derived_name()
    }

    pub(crate) fn expand(&self, ctx: &ExpansionContext<'_>) -> ConstructedSegment {
        let name = self.name();
        let output = ctx.graph.artifact_name(self.output);
        let action = ctx.providers.source.source(&SourceRequest {
            action_name: &name,
            repository: &self.repository,
            output: &output,
        });

        ConstructedSegment {
            name,
            actions: vec![action.with_run_order(1)],
        }
    }
}
