// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Segments: declared units of pipeline work
//!
//! A segment binds to artifacts when it is registered with an
//! [`ArtifactGraph`] and later expands into an ordered list of actions.
//! The closed set of variants is matched exhaustively wherever placement
//! rules care about the kind.

mod build;
mod generic;
mod schedule;
mod self_update;
mod source;

pub use build::{BuildConfig, ComputeType};
pub use generic::{DeploymentTarget, GenericSegment, StackTarget, DEFAULT_OUTPUT_FILE};
pub use schedule::{Schedule, ScheduleFlags, Step};
pub use self_update::{SelfUpdateSegment, UPDATE_ACTION};
pub use source::{
    CodeCommitRepository, CodeStarConnection, GitHubRepository, S3Location, SourceRepository,
    SourceSegment, SourceTrigger,
};

use serde::Serialize;
use std::fmt;

use crate::action::Action;
use crate::artifact::{ArtifactGraph, ArtifactId, ArtifactPath};
use crate::pipeline::PipelineContext;
use crate::providers::Providers;

/// Capability of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SegmentKind {
    Source,
    SelfUpdate,
    Generic,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::SelfUpdate => write!(f, "self-update"),
            Self::Generic => write!(f, "stack"),
        }
    }
}

/// A segment of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Source(SourceSegment),
    SelfUpdate(SelfUpdateSegment),
    Generic(GenericSegment),
}

impl Segment {
    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::Source(_) => SegmentKind::Source,
            Self::SelfUpdate(_) => SegmentKind::SelfUpdate,
            Self::Generic(_) => SegmentKind::Generic,
        }
    }

    /// Label used in messages and graphs, available before expansion
    pub fn label(&self) -> String {
        match self {
            Self::Source(source) => source.name(),
            Self::SelfUpdate(_) => UPDATE_ACTION.to_string(),
            Self::Generic(generic) => generic.name(),
        }
    }

    /// Consumed artifacts, primary input first
    pub fn inputs(&self) -> Vec<ArtifactId> {
        match self {
            Self::Source(_) => Vec::new(),
            Self::SelfUpdate(update) => std::iter::once(update.input)
                .chain(update.extra_inputs.iter().copied())
                .collect(),
            Self::Generic(generic) => std::iter::once(generic.input)
                .chain(generic.extra_inputs.iter().copied())
                .collect(),
        }
    }

    /// Produced artifacts
    pub fn outputs(&self) -> Vec<ArtifactId> {
        match self {
            Self::Source(source) => vec![source.output],
            Self::SelfUpdate(update) => update.output.into_iter().collect(),
            Self::Generic(generic) => generic.outputs(),
        }
    }

    /// Lower this segment into its named, ordered actions.
    ///
    /// Deterministic: the same segment and context always yield the same
    /// actions in the same order.
    pub fn expand(&self, ctx: &ExpansionContext<'_>) -> ConstructedSegment {
        match self {
            Self::Source(source) => source.expand(ctx),
            Self::SelfUpdate(update) => update.expand(ctx),
            Self::Generic(generic) => generic.expand(ctx),
        }
    }
}

impl From<SourceSegment> for Segment {
    fn from(segment: SourceSegment) -> Self {
        Self::Source(segment)
    }
}

impl From<SelfUpdateSegment> for Segment {
    fn from(segment: SelfUpdateSegment) -> Self {
        Self::SelfUpdate(segment)
    }
}

impl From<GenericSegment> for Segment {
    fn from(segment: GenericSegment) -> Self {
        Self::Generic(segment)
    }
}

/// Result of expanding a segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructedSegment {
    pub name: String,
    pub actions: Vec<Action>,
}

/// Everything a segment may read while expanding
#[derive(Debug, Clone, Copy)]
pub struct ExpansionContext<'a> {
    pub pipeline: &'a PipelineContext,
    pub graph: &'a ArtifactGraph,
    pub providers: &'a Providers,
}

impl ExpansionContext<'_> {
    /// Reference `file` inside artifact `id`
    pub fn artifact_path(&self, id: ArtifactId, file: String) -> ArtifactPath {
        match self.graph.get_artifact(id) {
            Some(artifact) => artifact.at_path(file),
            None => ArtifactPath {
                artifact: self.graph.artifact_name(id),
                file,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionCategory;

    struct Fixture {
        graph: ArtifactGraph,
        pipeline: PipelineContext,
        providers: Providers,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                graph: ArtifactGraph::new(),
                pipeline: PipelineContext::new("Delivery").with_region("eu-central-1"),
                providers: Providers::default(),
            }
        }

        fn expand(&self, id: crate::artifact::SegmentId) -> ConstructedSegment {
            let ctx = ExpansionContext {
                pipeline: &self.pipeline,
                graph: &self.graph,
                providers: &self.providers,
            };
            self.graph.segment(id).unwrap().expand(&ctx)
        }
    }

    fn run_orders(constructed: &ConstructedSegment) -> Vec<(&str, u32)> {
        constructed
            .actions
            .iter()
            .map(|a| (a.name.as_str(), a.run_order))
            .collect()
    }

    #[test]
    fn test_kinds_and_shapes() {
        let mut graph = ArtifactGraph::new();
        let src = graph.artifact(Some("Source"));
        let synth = graph.artifact(Some("Synth"));

        let source: Segment = SourceSegment::new(SourceRepository::code_commit("infra"), src).into();
        assert_eq!(source.kind(), SegmentKind::Source);
        assert!(source.inputs().is_empty());
        assert_eq!(source.outputs(), vec![src]);

        let update: Segment = SelfUpdateSegment::new(src, BuildConfig::new()).output(synth).into();
        assert_eq!(update.kind(), SegmentKind::SelfUpdate);
        assert_eq!(update.inputs(), vec![src]);
        assert_eq!(update.outputs(), vec![synth]);

        let generic: Segment = GenericSegment::new(StackTarget::new("Api"), synth)
            .extra_inputs(vec![src])
            .into();
        assert_eq!(generic.kind(), SegmentKind::Generic);
        assert_eq!(generic.inputs(), vec![synth, src]);
        assert!(generic.outputs().is_empty());
    }

    #[test]
    fn test_source_expands_to_single_named_action() {
        let mut fx = Fixture::new();
        let src = fx.graph.artifact(Some("Source"));
        let id = fx
            .graph
            .add_segment(SourceSegment::new(
                SourceRepository::code_star("arn:conn", "acme", "infra").with_branch("main"),
                src,
            ))
            .unwrap();

        let constructed = fx.expand(id);
        assert_eq!(constructed.name, "acme/infra/main");
        assert_eq!(constructed.actions.len(), 1);
        assert_eq!(constructed.actions[0].name, "acme/infra/main");
        assert_eq!(constructed.actions[0].category, ActionCategory::Source);
        assert_eq!(constructed.actions[0].outputs, vec!["Source"]);
    }

    #[test]
    fn test_self_update_expands_to_one_action() {
        let mut fx = Fixture::new();
        let src = fx.graph.artifact(Some("Source"));
        let synth = fx.graph.artifact(Some("Synth"));
        let id = fx
            .graph
            .add_segment(SelfUpdateSegment::new(src, BuildConfig::new()).output(synth))
            .unwrap();

        let constructed = fx.expand(id);
        assert_eq!(constructed.name, "Delivery");
        assert_eq!(run_orders(&constructed), vec![(UPDATE_ACTION, 1)]);
        assert_eq!(constructed.actions[0].inputs, vec!["Source"]);
        assert_eq!(constructed.actions[0].outputs, vec!["Synth"]);
    }

    #[test]
    fn test_stack_run_orders_follow_schedule() {
        let cases = [
            (false, false, vec![("PrepareChanges", 1), ("ExecuteChanges", 2)]),
            (
                true,
                false,
                vec![
                    ("Build", 1),
                    ("PublishAssets", 2),
                    ("PrepareChanges", 3),
                    ("ExecuteChanges", 4),
                ],
            ),
            (
                false,
                true,
                vec![("PrepareChanges", 1), ("ApproveChanges", 2), ("ExecuteChanges", 3)],
            ),
            (
                true,
                true,
                vec![
                    ("Build", 1),
                    ("PublishAssets", 2),
                    ("PrepareChanges", 3),
                    ("ApproveChanges", 4),
                    ("ExecuteChanges", 5),
                ],
            ),
        ];

        for (build, approval, expected) in cases {
            let mut fx = Fixture::new();
            let synth = fx.graph.artifact(Some("Synth"));
            let mut segment =
                GenericSegment::new(StackTarget::new("Api"), synth).manual_approval(approval);
            if build {
                segment = segment.build(BuildConfig::new().with_commands(["make"]));
            }
            let id = fx.graph.add_segment(segment).unwrap();

            let constructed = fx.expand(id);
            assert_eq!(constructed.name, "Api");
            assert_eq!(run_orders(&constructed), expected, "build={build} approval={approval}");
        }
    }

    #[test]
    fn test_template_path_uses_effective_input() {
        let mut fx = Fixture::new();
        let synth = fx.graph.artifact(Some("Synth"));
        let direct = fx
            .graph
            .add_segment(GenericSegment::new(StackTarget::new("Direct"), synth))
            .unwrap();
        let built = fx
            .graph
            .add_segment(
                GenericSegment::new(StackTarget::new("Built"), synth).build(BuildConfig::new()),
            )
            .unwrap();

        let direct = fx.expand(direct);
        assert_eq!(
            direct.actions[0].config_str("TemplatePath"),
            Some("Synth::cdk.out/Direct.template.json")
        );

        let built = fx.expand(built);
        let prepare = built.actions.iter().find(|a| a.name == "PrepareChanges").unwrap();
        assert_eq!(
            prepare.config_str("TemplatePath"),
            Some("BuiltBuild::cdk.out/Built.template.json")
        );
    }

    #[test]
    fn test_change_set_identity_threaded_through() {
        let mut fx = Fixture::new();
        let synth = fx.graph.artifact(Some("Synth"));
        let outputs = fx.graph.artifact(Some("ApiOutputs"));
        let id = fx
            .graph
            .add_segment(
                GenericSegment::new(StackTarget::new("Api"), synth)
                    .stack_name("api-prod")
                    .output(outputs)
                    .manual_approval(true),
            )
            .unwrap();

        let constructed = fx.expand(id);
        let prepare = &constructed.actions[0];
        let execute = constructed.actions.last().unwrap();

        for action in [prepare, execute] {
            assert_eq!(action.config_str("StackName"), Some("api-prod"));
            assert_eq!(action.config_str("ChangeSetName"), Some("ApiChanges"));
        }
        assert_eq!(execute.outputs, vec!["ApiOutputs"]);
        assert_eq!(execute.config_str("OutputFileName"), Some(DEFAULT_OUTPUT_FILE));
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let mut fx = Fixture::new();
        let synth = fx.graph.artifact(Some("Synth"));
        let id = fx
            .graph
            .add_segment(
                GenericSegment::new(StackTarget::new("Api"), synth)
                    .build(BuildConfig::new().with_env("STAGE", "prod").with_env("A", "1"))
                    .manual_approval(true),
            )
            .unwrap();

        assert_eq!(fx.expand(id), fx.expand(id));
    }
}
