// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Central artifact/segment registry
//!
//! Segment construction is the only writer: [`ArtifactGraph::add_segment`]
//! consumes every input and produces every output of the new segment.
//! Assembly only reads the graph.

use std::collections::BTreeMap;

use tracing::debug;

use super::{Artifact, ArtifactId, SegmentId};
use crate::errors::{SegpipeError, SegpipeResult};
use crate::segment::Segment;

/// Base name of the intermediate artifact a stack build produces
pub fn build_artifact_name(stack: &str) -> String {
    format!("{}Build", stack)
}

/// Registry of artifacts, segments and the edges between them
#[derive(Debug, Default)]
pub struct ArtifactGraph {
    artifacts: BTreeMap<ArtifactId, Artifact>,
    segments: BTreeMap<SegmentId, Segment>,
    /// At most one producer per artifact
    producers: BTreeMap<ArtifactId, SegmentId>,
    /// Consumer edges in registration order
    consumers: Vec<(ArtifactId, SegmentId)>,
    next_artifact: u32,
    next_segment: u32,
}

impl ArtifactGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new artifact
    pub fn artifact(&mut self, name: Option<&str>) -> ArtifactId {
        let id = ArtifactId(self.next_artifact);
        self.next_artifact += 1;
        self.artifacts
            .insert(id, Artifact::new(id, name.map(str::to_string)));
        id
    }

    /// Look up an artifact
    pub fn get_artifact(&self, id: ArtifactId) -> Option<&Artifact> {
        self.artifacts.get(&id)
    }

    /// Rendered name of an artifact
    pub fn artifact_name(&self, id: ArtifactId) -> String {
        self.artifacts
            .get(&id)
            .map(Artifact::name)
            .unwrap_or_else(|| format!("Artifact_{}", id.0))
    }

    /// All artifacts in declaration order
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    /// Look up a segment
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    /// All segments in registration order
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.segments.iter().map(|(id, segment)| (*id, segment))
    }

    /// Label of a segment for messages
    pub fn segment_label(&self, id: SegmentId) -> String {
        self.segments
            .get(&id)
            .map(Segment::label)
            .unwrap_or_else(|| format!("segment {}", id))
    }

    /// Register a segment, binding it to its artifacts.
    ///
    /// Fails without touching the graph if any referenced artifact is
    /// unknown or any output already has a producer.
    pub fn add_segment(&mut self, segment: impl Into<Segment>) -> SegpipeResult<SegmentId> {
        let mut segment = segment.into();

        for artifact in segment.inputs().into_iter().chain(segment.outputs()) {
            self.require_artifact(artifact)?;
        }

        let outputs = segment.outputs();
        for (i, output) in outputs.iter().enumerate() {
            let producer = match self.producers.get(output) {
                Some(existing) => Some(self.segment_label(*existing)),
                None if outputs[..i].contains(output) => Some(segment.label()),
                None => None,
            };
            if let Some(producer) = producer {
                return Err(SegpipeError::AlreadyProduced {
                    artifact: self.artifact_name(*output),
                    producer,
                    segment: segment.label(),
                });
            }
        }

        let id = SegmentId(self.next_segment);
        self.next_segment += 1;

        if let Segment::Generic(generic) = &mut segment {
            if generic.build.is_some() {
                let name = self.unique_artifact_name(&build_artifact_name(&generic.stack.name));
                let build_output = self.artifact(Some(&name));
                generic.bind_build_output(build_output);
            }
        }

        for input in segment.inputs() {
            self.consume(input, id)?;
        }
        for output in segment.outputs() {
            self.producers.insert(output, id);
        }

        debug!(
            segment = %segment.label(),
            kind = %segment.kind(),
            inputs = segment.inputs().len(),
            outputs = segment.outputs().len(),
            "Registered segment"
        );

        self.segments.insert(id, segment);
        Ok(id)
    }

    /// Register `segment` as the producer of `artifact`.
    ///
    /// Never idempotent: a second call for the same artifact fails, even
    /// with the same segment.
    pub fn produce(&mut self, artifact: ArtifactId, segment: SegmentId) -> SegpipeResult<()> {
        self.require_artifact(artifact)?;

        if let Some(existing) = self.producers.get(&artifact) {
            return Err(SegpipeError::AlreadyProduced {
                artifact: self.artifact_name(artifact),
                producer: self.segment_label(*existing),
                segment: self.segment_label(segment),
            });
        }

        self.producers.insert(artifact, segment);
        Ok(())
    }

    /// Register `segment` as a consumer of `artifact`
    pub fn consume(&mut self, artifact: ArtifactId, segment: SegmentId) -> SegpipeResult<()> {
        self.require_artifact(artifact)?;
        self.consumers.push((artifact, segment));
        Ok(())
    }

    /// The segment producing `artifact`, if any
    pub fn producer(&self, artifact: ArtifactId) -> Option<SegmentId> {
        self.producers.get(&artifact).copied()
    }

    /// Segments consuming `artifact`, in registration order
    pub fn consumers(&self, artifact: ArtifactId) -> Vec<SegmentId> {
        self.consumers
            .iter()
            .filter(|(a, _)| *a == artifact)
            .map(|(_, s)| *s)
            .collect()
    }

    /// Producer → consumer edges for every consumed artifact that has a producer
    pub fn edges(&self) -> Vec<(SegmentId, SegmentId, ArtifactId)> {
        self.consumers
            .iter()
            .filter_map(|(artifact, consumer)| {
                self.producers
                    .get(artifact)
                    .map(|producer| (*producer, *consumer, *artifact))
            })
            .collect()
    }

    /// `base`, or `base_N` with the first free N when the name is taken
    fn unique_artifact_name(&self, base: &str) -> String {
        let taken = |name: &str| self.artifacts.values().any(|a| a.name() == name);
        if !taken(base) {
            return base.to_string();
        }
        (2u32..)
            .map(|n| format!("{}_{}", base, n))
            .find(|name| !taken(name))
            .unwrap_or_else(|| base.to_string())
    }

    fn require_artifact(&self, id: ArtifactId) -> SegpipeResult<()> {
        if self.artifacts.contains_key(&id) {
            Ok(())
        } else {
            Err(SegpipeError::UnknownArtifact { id: id.0 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{
        BuildConfig, GenericSegment, SelfUpdateSegment, SourceRepository, SourceSegment,
        StackTarget,
    };

    fn source(output: ArtifactId) -> SourceSegment {
        SourceSegment::new(SourceRepository::s3("releases", "app.zip"), output)
    }

    #[test]
    fn test_produce_twice_fails() {
        let mut graph = ArtifactGraph::new();
        let artifact = graph.artifact(Some("Source"));
        let segment = graph.add_segment(source(artifact)).unwrap();

        let err = graph.produce(artifact, segment).unwrap_err();
        assert!(matches!(err, SegpipeError::AlreadyProduced { .. }));
    }

    #[test]
    fn test_produce_is_not_idempotent_for_fresh_artifact() {
        let mut graph = ArtifactGraph::new();
        let artifact = graph.artifact(None);
        let other = graph.artifact(None);
        let segment = graph.add_segment(source(other)).unwrap();

        graph.produce(artifact, segment).unwrap();
        assert!(graph.produce(artifact, segment).is_err());
        assert_eq!(graph.producer(artifact), Some(segment));
    }

    #[test]
    fn test_second_producer_segment_rejected_without_side_effects() {
        let mut graph = ArtifactGraph::new();
        let artifact = graph.artifact(Some("Source"));
        graph.add_segment(source(artifact)).unwrap();

        let err = graph.add_segment(source(artifact)).unwrap_err();
        assert_eq!(
            err,
            SegpipeError::AlreadyProduced {
                artifact: "Source".into(),
                producer: "releases-app.zip".into(),
                segment: "releases-app.zip".into(),
            }
        );
        assert_eq!(graph.segments().count(), 1);
    }

    #[test]
    fn test_consumers_keep_registration_order() {
        let mut graph = ArtifactGraph::new();
        let src = graph.artifact(Some("Source"));
        let synth = graph.artifact(Some("Synth"));

        let producer = graph.add_segment(source(src)).unwrap();
        let update = graph
            .add_segment(SelfUpdateSegment::new(src, BuildConfig::default()).output(synth))
            .unwrap();
        let first = graph
            .add_segment(GenericSegment::new(StackTarget::new("First"), synth))
            .unwrap();
        let second = graph
            .add_segment(GenericSegment::new(StackTarget::new("Second"), synth))
            .unwrap();

        assert_eq!(graph.producer(src), Some(producer));
        assert_eq!(graph.consumers(src), vec![update]);
        assert_eq!(graph.consumers(synth), vec![first, second]);
    }

    #[test]
    fn test_build_output_allocated_for_generic_with_build() {
        let mut graph = ArtifactGraph::new();
        let input = graph.artifact(Some("Synth"));
        let id = graph
            .add_segment(
                GenericSegment::new(StackTarget::new("Api"), input).build(BuildConfig::default()),
            )
            .unwrap();

        let Some(Segment::Generic(generic)) = graph.segment(id) else {
            panic!("Expected generic segment");
        };
        let build_output = generic.build_output().unwrap();
        assert_eq!(graph.artifact_name(build_output), "ApiBuild");
        assert_eq!(graph.producer(build_output), Some(id));
    }

    #[test]
    fn test_build_output_names_stay_unique() {
        let mut graph = ArtifactGraph::new();
        let input = graph.artifact(Some("Synth"));
        let declared = graph.artifact(Some("ApiBuild"));

        let mut build_outputs = Vec::new();
        for stack_name in ["api-us", "api-eu"] {
            let id = graph
                .add_segment(
                    GenericSegment::new(StackTarget::new("Api"), input)
                        .build(BuildConfig::default())
                        .stack_name(stack_name),
                )
                .unwrap();
            let Some(Segment::Generic(generic)) = graph.segment(id) else {
                panic!("Expected generic segment");
            };
            build_outputs.push(generic.build_output().unwrap());
        }

        let names: Vec<String> = build_outputs
            .iter()
            .map(|id| graph.artifact_name(*id))
            .collect();
        assert_eq!(names, vec!["ApiBuild_2", "ApiBuild_3"]);
        assert_eq!(graph.artifact_name(declared), "ApiBuild");

        let mut rendered: Vec<String> = graph.artifacts().map(Artifact::name).collect();
        rendered.sort();
        rendered.dedup();
        assert_eq!(rendered.len(), graph.artifacts().count());
    }

    #[test]
    fn test_unknown_artifact_rejected() {
        let mut other = ArtifactGraph::new();
        other.artifact(None);
        let foreign = other.artifact(None);

        let mut graph = ArtifactGraph::new();
        let err = graph.add_segment(source(foreign)).unwrap_err();
        assert_eq!(err, SegpipeError::UnknownArtifact { id: 1 });
    }

    #[test]
    fn test_edges_skip_unproduced_artifacts() {
        let mut graph = ArtifactGraph::new();
        let src = graph.artifact(Some("Source"));
        let orphan = graph.artifact(Some("Orphan"));
        let producer = graph.add_segment(source(src)).unwrap();
        let update = graph
            .add_segment(
                SelfUpdateSegment::new(src, BuildConfig::default()).extra_inputs(vec![orphan]),
            )
            .unwrap();

        assert_eq!(graph.edges(), vec![(producer, update, src)]);
        assert_eq!(graph.consumers(orphan), vec![update]);
        assert_eq!(graph.producer(orphan), None);
    }
}
