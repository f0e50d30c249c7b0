// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! CodeBuild provider
//!
//! Build actions export everything under the build directory as the
//! output artifact; asset publishing runs the asset publisher against the
//! manifest written there.

use serde_json::{json, Map, Value};

use super::{BuildProvider, BuildRequest, PublishRequest};
use crate::action::{Action, ActionCategory};

/// Image used for asset publishing
pub const PUBLISH_IMAGE: &str = "aws/codebuild/amazonlinux2-x86_64-standard:5.0";

/// Built-in build provider
pub struct CodeBuildProvider;

impl CodeBuildProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CodeBuildProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Add the artifact section exporting `build_dir` to a build spec
pub fn merge_build_spec(build_spec: Option<&Value>, build_dir: &str) -> Value {
    let files = if build_dir.is_empty() {
        "**/*".to_string()
    } else {
        format!("{}/**/*", build_dir)
    };

    let mut spec = match build_spec {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    let mut artifacts = match spec.remove("artifacts") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    artifacts.insert("files".to_string(), json!([files]));
    spec.insert("artifacts".to_string(), Value::Object(artifacts));

    Value::Object(spec)
}

impl BuildProvider for CodeBuildProvider {
    fn build(&self, request: &BuildRequest<'_>) -> Action {
        let environment_variables: Vec<Value> = request
            .config
            .environment_variables
            .iter()
            .map(|(name, value)| json!({ "name": name, "value": value, "type": "PLAINTEXT" }))
            .collect();

        let mut action = Action::new(request.action_name, ActionCategory::Build, "CodeBuild")
            .with_input(request.input)
            .with_inputs(request.extra_inputs.iter().cloned())
            .with_config("ProjectName", request.project_name)
            .with_config(
                "BuildSpec",
                merge_build_spec(request.config.build_spec.as_ref(), request.build_dir),
            )
            .with_config("Image", request.config.image.as_str())
            .with_config("ComputeType", request.config.compute_type.to_string());

        for output in request.outputs {
            action = action.with_output(output.as_str());
        }
        if !request.extra_inputs.is_empty() {
            action = action.with_config("PrimarySource", request.input);
        }
        if !environment_variables.is_empty() {
            action = action.with_config("EnvironmentVariables", environment_variables);
        }

        action
    }

    fn publish_assets(&self, request: &PublishRequest<'_>) -> Action {
        let manifest = if request.manifest_path.is_empty() {
            "."
        } else {
            request.manifest_path
        };

        let build_spec = json!({
            "version": "0.2",
            "phases": {
                "install": {
                    "runtime-versions": { "nodejs": "latest" },
                    "commands": ["npm i -g npm@latest @flit/publish-cdk-assets@latest"]
                },
                "build": {
                    "commands": [format!("pca {}", manifest)]
                }
            }
        });

        Action::new(request.action_name, ActionCategory::Build, "CodeBuild")
            .with_input(request.input)
            .with_config("ProjectName", request.project_name)
            .with_config("BuildSpec", build_spec)
            .with_config("Image", PUBLISH_IMAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::BuildConfig;

    #[test]
    fn test_merge_without_spec() {
        let spec = merge_build_spec(None, "cdk.out");
        assert_eq!(spec, json!({ "artifacts": { "files": ["cdk.out/**/*"] } }));
    }

    #[test]
    fn test_merge_keeps_phases_and_overrides_files() {
        let original = json!({
            "version": "0.2",
            "phases": { "build": { "commands": ["npm run build"] } },
            "artifacts": { "files": ["dist/**"], "discard-paths": "no" }
        });
        let spec = merge_build_spec(Some(&original), "app/cdk.out");

        assert_eq!(spec["phases"], original["phases"]);
        assert_eq!(spec["artifacts"]["files"], json!(["app/cdk.out/**/*"]));
        assert_eq!(spec["artifacts"]["discard-paths"], "no");
    }

    #[test]
    fn test_build_action_artifacts_and_env() {
        let config = BuildConfig::new().with_env("STAGE", "prod");
        let extra = vec!["Assets".to_string()];
        let outputs = vec!["ApiBuild".to_string()];
        let action = CodeBuildProvider::new().build(&BuildRequest {
            action_name: "Build",
            project_name: "ApiBuild",
            config: &config,
            input: "Synth",
            extra_inputs: &extra,
            outputs: &outputs,
            build_dir: "cdk.out",
        });

        assert_eq!(action.inputs, vec!["Synth", "Assets"]);
        assert_eq!(action.outputs, vec!["ApiBuild"]);
        assert_eq!(action.config_str("PrimarySource"), Some("Synth"));
        assert_eq!(action.config_str("ComputeType"), Some("BUILD_GENERAL1_SMALL"));
        assert_eq!(
            action.config("EnvironmentVariables").unwrap()[0]["name"],
            "STAGE"
        );
    }

    #[test]
    fn test_publish_assets_command() {
        let action = CodeBuildProvider::new().publish_assets(&PublishRequest {
            action_name: "PublishAssets",
            project_name: "ApiPublishAssets",
            input: "ApiBuild",
            manifest_path: "cdk.out",
        });

        assert_eq!(action.inputs, vec!["ApiBuild"]);
        assert_eq!(
            action.config("BuildSpec").unwrap()["phases"]["build"]["commands"][0],
            "pca cdk.out"
        );
    }
}
