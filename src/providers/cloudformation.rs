// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! CloudFormation change set provider

use super::{ChangeSetRequest, DeploymentOutput, DeploymentProvider};
use crate::action::{Action, ActionCategory};
use crate::artifact::ArtifactPath;

/// Capabilities granted when preparing change sets
pub const ADMIN_CAPABILITIES: &str = "CAPABILITY_NAMED_IAM,CAPABILITY_AUTO_EXPAND";

/// Built-in deployment provider
pub struct CloudFormationProvider;

impl CloudFormationProvider {
    pub fn new() -> Self {
        Self
    }

    fn base(request: &ChangeSetRequest<'_>, mode: &str) -> Action {
        let mut action = Action::new(request.action_name, ActionCategory::Deploy, "CloudFormation")
            .with_config("ActionMode", mode)
            .with_config("StackName", request.target.stack_name.as_str())
            .with_config("ChangeSetName", request.change_set_name);

        if let Some(account) = &request.target.account {
            action = action.with_config("Account", account.as_str());
        }
        if let Some(region) = &request.target.region {
            action = action.with_config("Region", region.as_str());
        }
        action
    }
}

impl Default for CloudFormationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DeploymentProvider for CloudFormationProvider {
    fn prepare_change_set(&self, request: &ChangeSetRequest<'_>, template: &ArtifactPath) -> Action {
        Self::base(request, "CHANGE_SET_REPLACE")
            .with_input(template.artifact.as_str())
            .with_config("TemplatePath", template.to_string())
            .with_config("Capabilities", ADMIN_CAPABILITIES)
    }

    fn execute_change_set(
        &self,
        request: &ChangeSetRequest<'_>,
        output: Option<&DeploymentOutput>,
    ) -> Action {
        let action = Self::base(request, "CHANGE_SET_EXECUTE");
        match output {
            Some(output) => action
                .with_output(output.artifact.as_str())
                .with_config("OutputFileName", output.file_name.as_str()),
            None => action,
        }
    }
}
