// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Build configuration shared by self-update and stack segments

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

/// How to build the input of a segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Build specification; the provider adds the artifact section
    #[serde(default)]
    pub build_spec: Option<Value>,

    /// Build image
    #[serde(default = "default_image")]
    pub image: String,

    /// Compute size
    #[serde(default)]
    pub compute_type: ComputeType,

    /// Plaintext environment variables
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
}

fn default_image() -> String {
    "aws/codebuild/standard:7.0".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            build_spec: None,
            image: default_image(),
            compute_type: ComputeType::default(),
            environment_variables: BTreeMap::new(),
        }
    }
}

impl BuildConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a build spec with a single build phase running `commands`
    pub fn with_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let commands: Vec<String> = commands.into_iter().map(Into::into).collect();
        self.build_spec = Some(json!({
            "version": "0.2",
            "phases": { "build": { "commands": commands } }
        }));
        self
    }

    pub fn with_build_spec(mut self, build_spec: Value) -> Self {
        self.build_spec = Some(build_spec);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_compute_type(mut self, compute_type: ComputeType) -> Self {
        self.compute_type = compute_type;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment_variables.insert(key.into(), value.into());
        self
    }
}

/// Build compute sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeType {
    #[default]
    Small,
    Medium,
    Large,
}

impl fmt::Display for ComputeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Small => write!(f, "BUILD_GENERAL1_SMALL"),
            Self::Medium => write!(f, "BUILD_GENERAL1_MEDIUM"),
            Self::Large => write!(f, "BUILD_GENERAL1_LARGE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_commands_builds_spec() {
        let config = BuildConfig::new().with_commands(["npm ci", "npm run build"]);
        let spec = config.build_spec.unwrap();
        assert_eq!(spec["version"], "0.2");
        assert_eq!(spec["phases"]["build"]["commands"][1], "npm run build");
    }

    #[test]
    fn test_parse_with_defaults() {
        let config: BuildConfig = serde_yaml::from_str("compute_type: large").unwrap();
        assert_eq!(config.compute_type, ComputeType::Large);
        assert_eq!(config.image, "aws/codebuild/standard:7.0");
        assert!(config.build_spec.is_none());
    }
}
