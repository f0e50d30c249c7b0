// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Action providers
//!
//! Segments never build provider-specific actions themselves. They call
//! these capability traits with what they know (artifacts, names, the
//! deployment target) and assign run orders to what comes back.

mod cloudformation;
mod codebuild;
mod connections;
mod manual;

pub use cloudformation::CloudFormationProvider;
pub use codebuild::CodeBuildProvider;
pub use connections::ConnectionSourceProvider;
pub use manual::ManualApprovalProvider;

use std::fmt;

use crate::action::Action;
use crate::artifact::ArtifactPath;
use crate::segment::{BuildConfig, DeploymentTarget, SourceRepository};

/// Input for a source action
#[derive(Debug, Clone, Copy)]
pub struct SourceRequest<'a> {
    pub action_name: &'a str,
    pub repository: &'a SourceRepository,
    /// Name of the artifact the source writes
    pub output: &'a str,
}

/// Input for a build action
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    pub action_name: &'a str,
    pub project_name: &'a str,
    pub config: &'a BuildConfig,
    pub input: &'a str,
    pub extra_inputs: &'a [String],
    pub outputs: &'a [String],
    /// Directory the build writes synthesized templates and assets to
    pub build_dir: &'a str,
}

/// Input for an asset publishing action
#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
    pub action_name: &'a str,
    pub project_name: &'a str,
    /// Artifact holding the build output
    pub input: &'a str,
    /// Directory holding the asset manifest
    pub manifest_path: &'a str,
}

/// Identity of a change set and where it applies
#[derive(Debug, Clone, Copy)]
pub struct ChangeSetRequest<'a> {
    pub action_name: &'a str,
    pub target: &'a DeploymentTarget,
    pub change_set_name: &'a str,
}

/// Where deployment outputs are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOutput {
    pub artifact: String,
    pub file_name: String,
}

/// Fetches sources into the pipeline
pub trait SourceProvider: Send + Sync {
    fn source(&self, request: &SourceRequest<'_>) -> Action;
}

/// Runs builds and publishes their assets
pub trait BuildProvider: Send + Sync {
    fn build(&self, request: &BuildRequest<'_>) -> Action;

    fn publish_assets(&self, request: &PublishRequest<'_>) -> Action;
}

/// Prepares and executes change sets
pub trait DeploymentProvider: Send + Sync {
    fn prepare_change_set(&self, request: &ChangeSetRequest<'_>, template: &ArtifactPath) -> Action;

    fn execute_change_set(
        &self,
        request: &ChangeSetRequest<'_>,
        output: Option<&DeploymentOutput>,
    ) -> Action;
}

/// Gates a change set behind a manual approval
pub trait ApprovalProvider: Send + Sync {
    fn approve(&self, request: &ChangeSetRequest<'_>) -> Action;
}

/// The set of providers used while expanding segments
pub struct Providers {
    pub source: Box<dyn SourceProvider>,
    pub build: Box<dyn BuildProvider>,
    pub deployment: Box<dyn DeploymentProvider>,
    pub approval: Box<dyn ApprovalProvider>,
}

impl Providers {
    pub fn with_source(mut self, provider: impl SourceProvider + 'static) -> Self {
        self.source = Box::new(provider);
        self
    }

    pub fn with_build(mut self, provider: impl BuildProvider + 'static) -> Self {
        self.build = Box::new(provider);
        self
    }

    pub fn with_deployment(mut self, provider: impl DeploymentProvider + 'static) -> Self {
        self.deployment = Box::new(provider);
        self
    }

    pub fn with_approval(mut self, provider: impl ApprovalProvider + 'static) -> Self {
        self.approval = Box::new(provider);
        self
    }
}

impl Default for Providers {
    fn default() -> Self {
        Self {
            source: Box::new(ConnectionSourceProvider::new()),
            build: Box::new(CodeBuildProvider::new()),
            deployment: Box::new(CloudFormationProvider::new()),
            approval: Box::new(ManualApprovalProvider::new()),
        }
    }
}

impl fmt::Debug for Providers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Providers").finish_non_exhaustive()
    }
}
