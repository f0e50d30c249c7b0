// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Pipeline actions
//!
//! An action is the atomic unit a segment expands into. The assembler only
//! orders actions; the provider-specific configuration is opaque to it.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Broad category of an action, matching the orchestrator's action types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionCategory {
    Source,
    Build,
    Approval,
    Deploy,
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "Source"),
            Self::Build => write!(f, "Build"),
            Self::Approval => write!(f, "Approval"),
            Self::Deploy => write!(f, "Deploy"),
        }
    }
}

/// A single action within a stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub name: String,
    pub run_order: u32,
    pub category: ActionCategory,
    /// Provider name understood by the orchestrator (e.g. `CodeBuild`)
    pub provider: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub configuration: BTreeMap<String, Value>,
}

impl Action {
    /// Create an action with run order 1 and no artifacts
    pub fn new(name: impl Into<String>, category: ActionCategory, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            run_order: 1,
            category,
            provider: provider.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            namespace: None,
            configuration: BTreeMap::new(),
        }
    }

    pub fn with_run_order(mut self, run_order: u32) -> Self {
        self.run_order = run_order;
        self
    }

    pub fn with_input(mut self, artifact: impl Into<String>) -> Self {
        self.inputs.push(artifact.into());
        self
    }

    pub fn with_inputs<I, S>(mut self, artifacts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(artifacts.into_iter().map(Into::into));
        self
    }

    pub fn with_output(mut self, artifact: impl Into<String>) -> Self {
        self.outputs.push(artifact.into());
        self
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Set a configuration entry
    pub fn with_config(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.configuration.insert(key.to_string(), value.into());
        self
    }

    /// Read a configuration entry
    pub fn config(&self, key: &str) -> Option<&Value> {
        self.configuration.get(key)
    }

    /// Read a string configuration entry
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.configuration.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let action = Action::new("Build", ActionCategory::Build, "CodeBuild")
            .with_input("Source")
            .with_config("ProjectName", "api-build");

        assert_eq!(action.run_order, 1);
        assert_eq!(action.inputs, vec!["Source"]);
        assert_eq!(action.config_str("ProjectName"), Some("api-build"));
        assert!(action.outputs.is_empty());
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let action = Action::new("ApproveChanges", ActionCategory::Approval, "Manual")
            .with_run_order(4);
        let json = serde_json::to_value(&action).unwrap();

        assert_eq!(json["run_order"], 4);
        assert!(json.get("inputs").is_none());
        assert!(json.get("configuration").is_none());
    }
}
