// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for fixing a pipeline definition.

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest giving a second producer its own artifact
    pub fn split_artifact(artifact: &str) -> Self {
        Self {
            action: format!("Give each producer of '{}' its own artifact", artifact),
            steps: vec![
                "Every artifact has exactly one producing segment".into(),
                "Declare a new artifact and bind it as the second segment's output".into(),
                "Point downstream consumers at whichever artifact they actually need".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest producing an artifact that is consumed but never produced
    pub fn produce_artifact(segment: &str, artifact: &str) -> Self {
        Self {
            action: format!("Produce '{}' before it is consumed", artifact),
            steps: vec![
                format!("Segment '{}' reads '{}' but nothing writes it", segment, artifact),
                "Bind the artifact as the output of a source or self-update segment".into(),
                "Or change the segment input to an artifact that is produced".into(),
            ],
            commands: vec![
                "# Show which segments produce and consume each artifact:".into(),
                "segpipe graph --format text".into(),
            ],
        }
    }

    /// Suggest moving a source segment into the first stage
    pub fn move_source(segment: &str) -> Self {
        Self {
            action: format!("Move '{}' so that only sources share the first stage", segment),
            steps: vec![
                "The first stage holds source segments and nothing else".into(),
                "Source segments never appear after the first stage".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest adding the self-update segment
    pub fn add_self_update() -> Self {
        Self {
            action: "Add a self-update segment as the second stage".into(),
            steps: vec![
                "The pipeline rebuilds its own definition before deploying anything".into(),
                "Add a 'self_update' segment consuming the source artifact".into(),
            ],
            commands: vec![
                "# Start from a working definition:".into(),
                "segpipe init --force".into(),
            ],
        }
    }

    /// Suggest removing extra self-update segments
    pub fn remove_extra_self_updates(segments: &[String]) -> Self {
        Self {
            action: "Keep a single self-update segment".into(),
            steps: vec![
                format!("Found: {}", segments.join(", ")),
                "Remove all but one and place it alone in the second stage".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest moving the self-update segment into its own second stage
    pub fn move_self_update(segment: &str) -> Self {
        Self {
            action: format!("Place '{}' alone in the second stage", segment),
            steps: vec![
                "The second stage contains the self-update segment and nothing else".into(),
                "Move any other segments of that stage into a later stage".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest naming one of two stages that ended up with the same name
    pub fn rename_stage(name: &str) -> Self {
        Self {
            action: format!("Give one of the '{}' stages its own name", name),
            steps: vec![
                "Unnamed stages are named after the segments they contain".into(),
                "Set 'name' on one of the stages in the definition".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest declaring an artifact referenced by a definition file
    pub fn declare_artifact(name: &str) -> Self {
        Self {
            action: format!("Declare artifact '{}'", name),
            steps: vec![
                "Definition files list every artifact up front".into(),
                format!("Add '{}' to the top-level 'artifacts' list", name),
            ],
            commands: vec![],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
