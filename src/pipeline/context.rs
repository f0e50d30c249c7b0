// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Pipeline-wide settings visible to every segment during expansion

use serde::Serialize;
use std::path::{Component, PathBuf};

/// Pipeline name, build layout and default deployment environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineContext {
    pub pipeline_name: String,
    /// Project root relative to the source artifact
    pub root_dir: PathBuf,
    /// Synthesis output directory relative to `root_dir`
    pub out_dir: PathBuf,
    pub account: Option<String>,
    pub region: Option<String>,
}

impl PipelineContext {
    pub fn new(pipeline_name: impl Into<String>) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            root_dir: PathBuf::from("."),
            out_dir: PathBuf::from("cdk.out"),
            account: None,
            region: None,
        }
    }

    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// `root_dir/out_dir` without `.` components
    pub fn build_dir(&self) -> PathBuf {
        self.root_dir
            .join(&self.out_dir)
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    }

    /// Build directory with `/` separators, as used inside artifacts
    pub fn build_dir_string(&self) -> String {
        self.build_dir().to_string_lossy().replace('\\', "/")
    }

    /// Path of `file` inside the build directory
    pub fn build_path(&self, file: &str) -> String {
        let dir = self.build_dir_string();
        if dir.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", dir, file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_build_dir() {
        let ctx = PipelineContext::new("Delivery");
        assert_eq!(ctx.build_dir_string(), "cdk.out");
        assert_eq!(ctx.build_path("Api.template.json"), "cdk.out/Api.template.json");
    }

    #[test]
    fn test_nested_root_dir() {
        let ctx = PipelineContext::new("Delivery")
            .with_root_dir("./example/")
            .with_out_dir("out");
        assert_eq!(ctx.build_dir_string(), "example/out");
    }

    #[test]
    fn test_empty_build_dir() {
        let ctx = PipelineContext::new("Delivery").with_out_dir(".");
        assert_eq!(ctx.build_dir_string(), "");
        assert_eq!(ctx.build_path("Api.template.json"), "Api.template.json");
    }
}
