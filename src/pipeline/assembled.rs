// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Assembled pipeline: the validated, ordered plan

use serde::Serialize;

use crate::action::Action;
use crate::errors::SegpipeResult;

/// A named stage with its flattened actions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledStage {
    pub name: String,
    pub actions: Vec<Action>,
}

impl AssembledStage {
    /// Look up an action by name
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }
}

/// Ordered stages ready to hand to the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledPipeline {
    pub name: String,
    /// A pipeline that updates itself restarts with the new definition
    pub restart_execution_on_update: bool,
    pub stages: Vec<AssembledStage>,
}

impl AssembledPipeline {
    /// Total number of actions across all stages
    pub fn action_count(&self) -> usize {
        self.stages.iter().map(|s| s.actions.len()).sum()
    }

    /// Look up a stage by name
    pub fn stage(&self, name: &str) -> Option<&AssembledStage> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn to_json(&self) -> SegpipeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> SegpipeResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// BLAKE3 digest of the canonical JSON form.
    ///
    /// Identical definitions always produce identical fingerprints.
    pub fn fingerprint(&self) -> SegpipeResult<String> {
        let canonical = serde_json::to_vec(self)?;
        Ok(blake3::hash(&canonical).to_hex().to_string())
    }

    /// Human-readable plan, one line per action
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Pipeline: {}\n", self.name));

        for (i, stage) in self.stages.iter().enumerate() {
            out.push_str(&format!(
                "\n{}. {} ({} actions)\n",
                i + 1,
                stage.name,
                stage.actions.len()
            ));
            for action in &stage.actions {
                out.push_str(&format!(
                    "   [{}] {} ({}: {})",
                    action.run_order, action.name, action.category, action.provider
                ));
                if !action.inputs.is_empty() {
                    out.push_str(&format!(" <- {}", action.inputs.join(", ")));
                }
                if !action.outputs.is_empty() {
                    out.push_str(&format!(" -> {}", action.outputs.join(", ")));
                }
                out.push('\n');
            }
        }

        out
    }
}
