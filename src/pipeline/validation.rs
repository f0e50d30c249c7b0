// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Assembly validation
//!
//! Checks a group sequence against the artifact graph before anything is
//! expanded. Checks run in a fixed order and stop at the first failure:
//! structure, artifact completeness, source placement, self-update
//! placement.

use std::collections::BTreeSet;

use tracing::debug;

use super::SegmentGroup;
use crate::artifact::{ArtifactGraph, SegmentId};
use crate::errors::{SegpipeError, SegpipeResult};
use crate::segment::{Segment, SegmentKind};

/// Stage position reserved for source segments
pub const SOURCE_POSITION: usize = 0;

/// Stage position reserved for the self-update segment
pub const SELF_UPDATE_POSITION: usize = 1;

/// Validator for a group sequence
pub struct AssemblyValidator;

impl AssemblyValidator {
    /// Validate `groups` against `graph`, failing on the first violation
    pub fn validate(graph: &ArtifactGraph, groups: &[SegmentGroup]) -> SegpipeResult<()> {
        Self::check_structure(graph, groups)?;
        Self::check_artifacts(graph, groups)?;
        Self::check_sources(graph, groups)?;
        Self::check_self_update(graph, groups)?;
        Ok(())
    }

    /// Non-fatal findings for a definition that already validates
    pub fn lint(graph: &ArtifactGraph, groups: &[SegmentGroup]) -> ValidationReport {
        let mut report = ValidationReport::new();
        let placed: BTreeSet<SegmentId> = groups
            .iter()
            .flat_map(|group| group.segments.iter().copied())
            .collect();

        for (id, segment) in graph.segments() {
            if !placed.contains(&id) {
                report.add_warning(&format!(
                    "Segment '{}' is registered but not placed in any stage",
                    segment.label()
                ));
            }
        }

        for artifact in graph.artifacts() {
            let id = artifact.id();
            let consumers = graph.consumers(id);
            match graph.producer(id) {
                Some(producer) if !placed.contains(&producer) && !consumers.is_empty() => {
                    report.add_warning(&format!(
                        "Artifact '{}' is produced by '{}', which is not placed in any stage",
                        artifact.name(),
                        graph.segment_label(producer)
                    ));
                }
                Some(_) if consumers.is_empty() => {
                    report.add_warning(&format!(
                        "Artifact '{}' is produced but never consumed",
                        artifact.name()
                    ));
                }
                None if consumers.is_empty() => {
                    report.add_warning(&format!(
                        "Artifact '{}' is declared but never used",
                        artifact.name()
                    ));
                }
                _ => {}
            }
        }

        report
    }

    fn segment<'g>(graph: &'g ArtifactGraph, id: SegmentId) -> SegpipeResult<&'g Segment> {
        graph
            .segment(id)
            .ok_or(SegpipeError::UnknownSegment { id: id.0 })
    }

    /// Non-empty pipeline, non-empty groups, known segments placed once
    fn check_structure(graph: &ArtifactGraph, groups: &[SegmentGroup]) -> SegpipeResult<()> {
        if groups.is_empty() {
            return Err(SegpipeError::EmptyPipeline);
        }

        let mut placed = BTreeSet::new();
        for (position, group) in groups.iter().enumerate() {
            if group.is_empty() {
                return Err(SegpipeError::EmptyStage { position });
            }
            for id in &group.segments {
                let segment = Self::segment(graph, *id)?;
                if !placed.insert(*id) {
                    return Err(SegpipeError::DuplicatePlacement {
                        segment: segment.label(),
                    });
                }
            }
            debug!(position, segments = group.len(), "Validated stage structure");
        }

        Ok(())
    }

    /// Every consumed artifact has a producer
    fn check_artifacts(graph: &ArtifactGraph, groups: &[SegmentGroup]) -> SegpipeResult<()> {
        for group in groups {
            for id in &group.segments {
                let segment = Self::segment(graph, *id)?;
                for input in segment.inputs() {
                    if graph.producer(input).is_none() {
                        return Err(SegpipeError::DanglingArtifact {
                            segment: segment.label(),
                            artifact: graph.artifact_name(input),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Sources only in the first group, and the first group only sources
    fn check_sources(graph: &ArtifactGraph, groups: &[SegmentGroup]) -> SegpipeResult<()> {
        for (position, group) in groups.iter().enumerate() {
            for id in &group.segments {
                let segment = Self::segment(graph, *id)?;
                let reason = match (segment.kind(), position) {
                    (SegmentKind::Source, SOURCE_POSITION) => continue,
                    (SegmentKind::Source, _) => "source segments belong in the first stage",
                    (SegmentKind::SelfUpdate | SegmentKind::Generic, SOURCE_POSITION) => {
                        "the first stage may only contain source segments"
                    }
                    (SegmentKind::SelfUpdate | SegmentKind::Generic, _) => continue,
                };
                return Err(SegpipeError::MisplacedSource {
                    segment: segment.label(),
                    position,
                    reason: reason.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Exactly one self-update segment, alone in the second group
    fn check_self_update(graph: &ArtifactGraph, groups: &[SegmentGroup]) -> SegpipeResult<()> {
        let mut found = Vec::new();
        for (position, group) in groups.iter().enumerate() {
            for id in &group.segments {
                let segment = Self::segment(graph, *id)?;
                match segment.kind() {
                    SegmentKind::SelfUpdate => found.push((position, segment.label())),
                    SegmentKind::Source | SegmentKind::Generic => {}
                }
            }
        }

        match found.as_slice() {
            [] => Err(SegpipeError::MissingSelfUpdate),
            [(position, segment)] => {
                let reason = if *position != SELF_UPDATE_POSITION {
                    "the self-update segment belongs in the second stage"
                } else if groups[*position].len() > 1 {
                    "the self-update segment must be alone in its stage"
                } else {
                    return Ok(());
                };
                Err(SegpipeError::MisplacedSelfUpdate {
                    segment: segment.clone(),
                    position: *position,
                    reason: reason.to_string(),
                })
            }
            many => Err(SegpipeError::DuplicateSelfUpdate {
                count: many.len(),
                segments: many
                    .iter()
                    .map(|(position, label)| format!("{} (stage {})", label, position))
                    .collect(),
            }),
        }
    }
}

/// Non-fatal findings of a validation pass
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactId;
    use crate::segment::{
        BuildConfig, GenericSegment, SelfUpdateSegment, SourceRepository, SourceSegment,
        StackTarget,
    };

    struct Parts {
        graph: ArtifactGraph,
        source: SegmentId,
        update: SegmentId,
        stack: SegmentId,
        synth: ArtifactId,
    }

    fn parts() -> Parts {
        let mut graph = ArtifactGraph::new();
        let src = graph.artifact(Some("Source"));
        let synth = graph.artifact(Some("Synth"));
        let source = graph
            .add_segment(SourceSegment::new(SourceRepository::code_commit("infra"), src))
            .unwrap();
        let update = graph
            .add_segment(SelfUpdateSegment::new(src, BuildConfig::new()).output(synth))
            .unwrap();
        let stack = graph
            .add_segment(GenericSegment::new(StackTarget::new("Api"), synth))
            .unwrap();
        Parts {
            graph,
            source,
            update,
            stack,
            synth,
        }
    }

    fn groups(ids: &[&[SegmentId]]) -> Vec<SegmentGroup> {
        ids.iter().map(|g| SegmentGroup::new(g.to_vec())).collect()
    }

    #[test]
    fn test_valid_layout() {
        let p = parts();
        let groups = groups(&[&[p.source], &[p.update], &[p.stack]]);
        assert!(AssemblyValidator::validate(&p.graph, &groups).is_ok());
    }

    #[test]
    fn test_empty_pipeline_and_stage() {
        let p = parts();
        assert_eq!(
            AssemblyValidator::validate(&p.graph, &[]),
            Err(SegpipeError::EmptyPipeline)
        );

        let groups = groups(&[&[p.source], &[], &[p.update]]);
        assert_eq!(
            AssemblyValidator::validate(&p.graph, &groups),
            Err(SegpipeError::EmptyStage { position: 1 })
        );
    }

    #[test]
    fn test_duplicate_placement() {
        let p = parts();
        let groups = groups(&[&[p.source], &[p.update], &[p.stack], &[p.stack]]);
        assert_eq!(
            AssemblyValidator::validate(&p.graph, &groups),
            Err(SegpipeError::DuplicatePlacement {
                segment: "Api".into()
            })
        );
    }

    #[test]
    fn test_dangling_artifact() {
        let mut p = parts();
        let orphan = p.graph.artifact(Some("Orphan"));
        let consumer = p
            .graph
            .add_segment(GenericSegment::new(StackTarget::new("Web"), orphan))
            .unwrap();

        let groups = groups(&[&[p.source], &[p.update], &[p.stack, consumer]]);
        assert_eq!(
            AssemblyValidator::validate(&p.graph, &groups),
            Err(SegpipeError::DanglingArtifact {
                segment: "Web".into(),
                artifact: "Orphan".into(),
            })
        );
    }

    #[test]
    fn test_source_mixed_into_first_group() {
        let p = parts();
        let groups = groups(&[&[p.source, p.stack], &[p.update]]);
        let err = AssemblyValidator::validate(&p.graph, &groups).unwrap_err();
        assert!(matches!(
            err,
            SegpipeError::MisplacedSource { ref segment, position: 0, .. } if segment == "Api"
        ));
    }

    #[test]
    fn test_source_outside_first_group() {
        let mut p = parts();
        let other = p.graph.artifact(Some("Other"));
        let late = p
            .graph
            .add_segment(SourceSegment::new(SourceRepository::s3("bucket", "key"), other))
            .unwrap();

        let groups = groups(&[&[p.source], &[p.update], &[p.stack, late]]);
        let err = AssemblyValidator::validate(&p.graph, &groups).unwrap_err();
        assert!(matches!(err, SegpipeError::MisplacedSource { position: 2, .. }));
    }

    #[test]
    fn test_missing_self_update() {
        let p = parts();
        let groups = groups(&[&[p.source], &[p.stack]]);
        // Synth is still produced by the unplaced update segment
        assert_eq!(
            AssemblyValidator::validate(&p.graph, &groups),
            Err(SegpipeError::MissingSelfUpdate)
        );
    }

    #[test]
    fn test_duplicate_self_update() {
        let mut p = parts();
        let second = p
            .graph
            .add_segment(SelfUpdateSegment::new(p.synth, BuildConfig::new()))
            .unwrap();

        let groups = groups(&[&[p.source], &[p.update], &[second]]);
        let err = AssemblyValidator::validate(&p.graph, &groups).unwrap_err();
        assert_eq!(
            err,
            SegpipeError::DuplicateSelfUpdate {
                count: 2,
                segments: vec![
                    "UpdatePipeline (stage 1)".into(),
                    "UpdatePipeline (stage 2)".into()
                ],
            }
        );
    }

    #[test]
    fn test_self_update_not_alone() {
        let p = parts();
        let groups = groups(&[&[p.source], &[p.update, p.stack]]);
        let err = AssemblyValidator::validate(&p.graph, &groups).unwrap_err();
        assert!(matches!(err, SegpipeError::MisplacedSelfUpdate { position: 1, .. }));
    }

    #[test]
    fn test_self_update_wrong_position() {
        let p = parts();
        let groups = groups(&[&[p.source], &[p.stack], &[p.update]]);
        let err = AssemblyValidator::validate(&p.graph, &groups).unwrap_err();
        assert!(matches!(err, SegpipeError::MisplacedSelfUpdate { position: 2, .. }));
    }

    #[test]
    fn test_lint_reports_unplaced_and_unused() {
        let mut p = parts();
        p.graph.artifact(Some("Spare"));

        let groups = groups(&[&[p.source], &[p.update]]);
        let report = AssemblyValidator::lint(&p.graph, &groups);

        assert!(report.has_warnings());
        assert!(report.warnings.iter().any(|w| w.contains("'Api'")));
        assert!(report.warnings.iter().any(|w| w.contains("'Spare'")));
    }
}
