// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Stack segment: optionally build, then deploy a stack through a change set
//!
//! The segment lowers into the steps of [`Schedule`]: build and publish
//! assets when a build is configured, prepare the change set, optionally
//! wait for approval, then execute the change set.

use serde::{Deserialize, Serialize};

use super::schedule::{Schedule, ScheduleFlags, Step};
use super::{BuildConfig, ConstructedSegment, ExpansionContext};
use crate::action::Action;
use crate::artifact::ArtifactId;
use crate::pipeline::PipelineContext;
use crate::providers::{BuildRequest, ChangeSetRequest, DeploymentOutput, PublishRequest};

/// Default file name for captured deployment outputs
pub const DEFAULT_OUTPUT_FILE: &str = "artifact.json";

/// The stack a segment deploys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackTarget {
    /// Stack name, also used as the segment name
    pub name: String,

    /// Template file inside the build directory
    #[serde(default)]
    pub template_file: Option<String>,

    #[serde(default)]
    pub account: Option<String>,

    #[serde(default)]
    pub region: Option<String>,
}

impl StackTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template_file: None,
            account: None,
            region: None,
        }
    }

    pub fn with_template_file(mut self, template_file: impl Into<String>) -> Self {
        self.template_file = Some(template_file.into());
        self
    }

    pub fn with_env(mut self, account: impl Into<String>, region: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self.region = Some(region.into());
        self
    }

    /// Template file, `<name>.template.json` unless set
    pub fn template_file(&self) -> String {
        self.template_file
            .clone()
            .unwrap_or_else(|| format!("{}.template.json", self.name))
    }
}

/// Where a change set is applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentTarget {
    pub stack_name: String,
    pub account: Option<String>,
    pub region: Option<String>,
}

/// Segment building and deploying one stack
#[derive(Debug, Clone, PartialEq)]
pub struct GenericSegment {
    pub stack: StackTarget,
    pub input: ArtifactId,
    pub extra_inputs: Vec<ArtifactId>,
    pub build: Option<BuildConfig>,
    /// Overrides the stack name the change set is applied to
    pub stack_name: Option<String>,
    pub account: Option<String>,
    pub region: Option<String>,
    /// Artifact capturing the deployment outputs
    pub output: Option<ArtifactId>,
    pub output_file_name: Option<String>,
    pub manual_approval: bool,
    build_output: Option<ArtifactId>,
}

impl GenericSegment {
    pub fn new(stack: StackTarget, input: ArtifactId) -> Self {
        Self {
            stack,
            input,
            extra_inputs: Vec::new(),
            build: None,
            stack_name: None,
            account: None,
            region: None,
            output: None,
            output_file_name: None,
            manual_approval: false,
            build_output: None,
        }
    }

    pub fn extra_inputs(mut self, extra_inputs: Vec<ArtifactId>) -> Self {
        self.extra_inputs = extra_inputs;
        self
    }

    pub fn build(mut self, build: BuildConfig) -> Self {
        self.build = Some(build);
        self
    }

    pub fn stack_name(mut self, stack_name: impl Into<String>) -> Self {
        self.stack_name = Some(stack_name.into());
        self
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn output(mut self, output: ArtifactId) -> Self {
        self.output = Some(output);
        self
    }

    pub fn output_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.output_file_name = Some(file_name.into());
        self
    }

    pub fn manual_approval(mut self, manual_approval: bool) -> Self {
        self.manual_approval = manual_approval;
        self
    }

    /// Intermediate build artifact, bound when the segment is registered
    pub fn build_output(&self) -> Option<ArtifactId> {
        self.build_output
    }

    pub(crate) fn bind_build_output(&mut self, artifact: ArtifactId) {
        self.build_output = Some(artifact);
    }

    pub fn name(&self) -> String {
        self.stack.name.clone()
    }

    /// Build output first, then the deployment output
    pub fn outputs(&self) -> Vec<ArtifactId> {
        self.build_output.iter().chain(self.output.iter()).copied().collect()
    }

    /// Change set name shared by the prepare and execute steps
    pub fn change_set_name(&self) -> String {
        format!("{}Changes", self.stack.name)
    }

    pub fn deployment_target(&self, pipeline: &PipelineContext) -> DeploymentTarget {
        DeploymentTarget {
            stack_name: self
                .stack_name
                .clone()
                .unwrap_or_else(|| self.stack.name.clone()),
            account: self
                .account
                .clone()
                .or_else(|| self.stack.account.clone())
                .or_else(|| pipeline.account.clone()),
            region: self
                .region
                .clone()
                .or_else(|| self.stack.region.clone())
                .or_else(|| pipeline.region.clone()),
        }
    }

    fn build_step(&self) -> Option<(&BuildConfig, ArtifactId)> {
        self.build.as_ref().zip(self.build_output)
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::new(ScheduleFlags {
            build: self.build_step().is_some(),
            approval: self.manual_approval,
        })
    }

    pub(crate) fn expand(&self, ctx: &ExpansionContext<'_>) -> ConstructedSegment {
        let name = self.name();
        let build_dir = ctx.pipeline.build_dir_string();
        let target = self.deployment_target(ctx.pipeline);
        let change_set_name = self.change_set_name();
        let change_set = |action_name| ChangeSetRequest {
            action_name,
            target: &target,
            change_set_name: &change_set_name,
        };

        let input = ctx.graph.artifact_name(self.input);
        let extra_inputs: Vec<String> = self
            .extra_inputs
            .iter()
            .map(|id| ctx.graph.artifact_name(*id))
            .collect();

        // Deploy from the build output when a build runs, else straight from the input
        let deploy_input = self
            .build_step()
            .map(|(_, build_output)| build_output)
            .unwrap_or(self.input);
        let template = ctx.artifact_path(
            deploy_input,
            ctx.pipeline.build_path(&self.stack.template_file()),
        );

        let deployment_output = self.output.map(|id| DeploymentOutput {
            artifact: ctx.graph.artifact_name(id),
            file_name: self
                .output_file_name
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string()),
        });

        let schedule = self.schedule();
        let mut actions: Vec<Action> = Vec::with_capacity(schedule.len());

        for (step, run_order) in schedule.iter() {
            let action = match step {
                Step::Build => {
                    let Some((config, build_output)) = self.build_step() else {
                        continue;
                    };
                    ctx.providers.build.build(&BuildRequest {
                        action_name: step.action_name(),
                        project_name: &format!("{}{}", name, step.action_name()),
                        config,
                        input: &input,
                        extra_inputs: &extra_inputs,
                        outputs: &[ctx.graph.artifact_name(build_output)],
                        build_dir: &build_dir,
                    })
                }
                Step::PublishAssets => {
                    let Some((_, build_output)) = self.build_step() else {
                        continue;
                    };
                    ctx.providers.build.publish_assets(&PublishRequest {
                        action_name: step.action_name(),
                        project_name: &format!("{}{}", name, step.action_name()),
                        input: &ctx.graph.artifact_name(build_output),
                        manifest_path: &build_dir,
                    })
                }
                Step::PrepareChangeSet => ctx
                    .providers
                    .deployment
                    .prepare_change_set(&change_set(step.action_name()), &template),
                Step::ManualApproval => ctx
                    .providers
                    .approval
                    .approve(&change_set(step.action_name())),
                Step::ExecuteChangeSet => ctx
                    .providers
                    .deployment
                    .execute_change_set(&change_set(step.action_name()), deployment_output.as_ref()),
            };
            actions.push(action.with_run_order(run_order));
        }

        ConstructedSegment { name, actions }
    }
}
