// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Manual approval provider

use super::{ApprovalProvider, ChangeSetRequest};
use crate::action::{Action, ActionCategory};

/// Built-in approval provider
pub struct ManualApprovalProvider;

impl ManualApprovalProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ManualApprovalProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ApprovalProvider for ManualApprovalProvider {
    fn approve(&self, request: &ChangeSetRequest<'_>) -> Action {
        Action::new(request.action_name, ActionCategory::Approval, "Manual").with_config(
            "CustomData",
            format!(
                "Review change set {} for stack {}",
                request.change_set_name, request.target.stack_name
            ),
        )
    }
}
