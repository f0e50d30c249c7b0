// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Artifacts and the producer/consumer registry
//!
//! Artifacts are the typed data passed between segments. Rather than
//! having artifacts and segments point at each other, both are stored by
//! identifier in an [`ArtifactGraph`] which also owns the producer and
//! consumer edges.

mod graph;

pub use graph::{build_artifact_name, ArtifactGraph};

use serde::Serialize;
use std::fmt;

/// Identifier of an artifact within one [`ArtifactGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ArtifactId(pub(crate) u32);

impl ArtifactId {
    /// Raw index of this artifact
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a segment within one [`ArtifactGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SegmentId(pub(crate) u32);

impl SegmentId {
    /// Raw index of this segment
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named unit of data passed between segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    id: ArtifactId,
    display_name: Option<String>,
}

impl Artifact {
    pub(crate) fn new(id: ArtifactId, display_name: Option<String>) -> Self {
        Self { id, display_name }
    }

    pub fn id(&self) -> ArtifactId {
        self.id
    }

    /// The caller-chosen name, if any
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Name used in rendered actions; generated when no display name was given
    pub fn name(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => format!("Artifact_{}", self.id.0),
        }
    }

    /// Reference a file inside this artifact
    pub fn at_path(&self, file: impl Into<String>) -> ArtifactPath {
        ArtifactPath {
            artifact: self.name(),
            file: file.into(),
        }
    }
}

/// A file location inside an artifact, rendered as `artifact::file`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPath {
    pub artifact: String,
    pub file: String,
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.artifact, self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_name_for_anonymous_artifact() {
        let artifact = Artifact::new(ArtifactId(7), None);
        assert_eq!(artifact.name(), "Artifact_7");
        assert_eq!(artifact.display_name(), None);
    }

    #[test]
    fn test_artifact_path_rendering() {
        let artifact = Artifact::new(ArtifactId(0), Some("Synth".into()));
        let path = artifact.at_path("cdk.out/Api.template.json");
        assert_eq!(path.to_string(), "Synth::cdk.out/Api.template.json");
    }
}
