// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Pipeline assembler
//!
//! Validates a group sequence and flattens it into named stages. The pass
//! is all-or-nothing: nothing is expanded unless every check passes.

use tracing::{debug, info};

use super::validation::{AssemblyValidator, ValidationReport, SELF_UPDATE_POSITION, SOURCE_POSITION};
use super::{AssembledPipeline, AssembledStage, PipelineContext, SegmentGroup};
use crate::artifact::ArtifactGraph;
use crate::errors::{SegpipeError, SegpipeResult};
use crate::providers::Providers;
use crate::segment::ExpansionContext;

/// Stage name used for the source stage
pub const SOURCE_STAGE: &str = "Source";

/// Stage name used for the self-update stage
pub const PIPELINE_STAGE: &str = "Pipeline";

/// Turns a fully built artifact graph into an [`AssembledPipeline`]
#[derive(Debug)]
pub struct Assembler {
    context: PipelineContext,
    graph: ArtifactGraph,
    providers: Providers,
}

impl Assembler {
    /// Create an assembler using the default providers
    pub fn new(context: PipelineContext, graph: ArtifactGraph) -> Self {
        Self {
            context,
            graph,
            providers: Providers::default(),
        }
    }

    /// Replace the action providers
    pub fn with_providers(mut self, providers: Providers) -> Self {
        self.providers = providers;
        self
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    pub fn graph(&self) -> &ArtifactGraph {
        &self.graph
    }

    /// Run every check `assemble` runs, plus the non-fatal lints
    pub fn validate(&self, groups: &[SegmentGroup]) -> SegpipeResult<ValidationReport> {
        AssemblyValidator::validate(&self.graph, groups)?;
        self.expand_stages(groups)?;
        Ok(AssemblyValidator::lint(&self.graph, groups))
    }

    /// Validate `groups` and expand them, in declaration order, into stages
    pub fn assemble(&self, groups: &[SegmentGroup]) -> SegpipeResult<AssembledPipeline> {
        AssemblyValidator::validate(&self.graph, groups)?;

        let pipeline = AssembledPipeline {
            name: self.context.pipeline_name.clone(),
            restart_execution_on_update: true,
            stages: self.expand_stages(groups)?,
        };

        info!(
            pipeline = %pipeline.name,
            stages = pipeline.stages.len(),
            actions = pipeline.action_count(),
            "Assembled pipeline"
        );

        Ok(pipeline)
    }

    /// Expand every group into a named stage; stage names must be unique
    fn expand_stages(&self, groups: &[SegmentGroup]) -> SegpipeResult<Vec<AssembledStage>> {
        let ctx = ExpansionContext {
            pipeline: &self.context,
            graph: &self.graph,
            providers: &self.providers,
        };

        let mut stages: Vec<AssembledStage> = Vec::with_capacity(groups.len());
        for (position, group) in groups.iter().enumerate() {
            let mut names = Vec::with_capacity(group.len());
            let mut actions = Vec::new();

            for id in &group.segments {
                let segment = self
                    .graph
                    .segment(*id)
                    .ok_or(SegpipeError::UnknownSegment { id: id.index() })?;
                let constructed = segment.expand(&ctx);
                debug!(
                    segment = %constructed.name,
                    position,
                    actions = constructed.actions.len(),
                    "Expanded segment"
                );
                names.push(constructed.name);
                actions.extend(constructed.actions);
            }

            let name = match (&group.name, position) {
                (Some(name), _) => name.clone(),
                (None, SOURCE_POSITION) => SOURCE_STAGE.to_string(),
                (None, SELF_UPDATE_POSITION) => PIPELINE_STAGE.to_string(),
                (None, _) => names.join("-"),
            };
            if let Some(first) = stages.iter().position(|stage| stage.name == name) {
                return Err(SegpipeError::DuplicateStageName {
                    name,
                    first: first + 1,
                    second: position + 1,
                });
            }
            stages.push(AssembledStage { name, actions });
        }

        Ok(stages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactId, SegmentId};
    use crate::segment::{
        BuildConfig, GenericSegment, SelfUpdateSegment, SourceRepository, SourceSegment,
        StackTarget,
    };

    fn run_orders(stage: &AssembledStage) -> Vec<u32> {
        stage.actions.iter().map(|a| a.run_order).collect()
    }

    struct Layout {
        graph: ArtifactGraph,
        source: SegmentId,
        update: SegmentId,
        api: SegmentId,
        web: SegmentId,
    }

    fn layout() -> Layout {
        let mut graph = ArtifactGraph::new();
        let src = graph.artifact(Some("Source"));
        let synth = graph.artifact(Some("Synth"));
        let source = graph
            .add_segment(SourceSegment::new(
                SourceRepository::code_star("arn:conn", "acme", "infra").with_branch("main"),
                src,
            ))
            .unwrap();
        let update = graph
            .add_segment(SelfUpdateSegment::new(src, BuildConfig::new()).output(synth))
            .unwrap();
        let api = graph
            .add_segment(
                GenericSegment::new(StackTarget::new("Api"), synth).build(BuildConfig::new()),
            )
            .unwrap();
        let web = graph
            .add_segment(GenericSegment::new(StackTarget::new("Web"), synth).manual_approval(true))
            .unwrap();
        Layout {
            graph,
            source,
            update,
            api,
            web,
        }
    }

    #[test]
    fn test_repeated_derived_stage_name_rejected() {
        let mut l = layout();
        let synth = ArtifactId(1);
        let second_api = l
            .graph
            .add_segment(
                GenericSegment::new(StackTarget::new("Api"), synth).stack_name("api-eu"),
            )
            .unwrap();
        let groups = vec![
            SegmentGroup::from(l.source),
            SegmentGroup::from(l.update),
            SegmentGroup::from(l.api),
            SegmentGroup::from(second_api),
        ];
        let assembler = Assembler::new(PipelineContext::new("Delivery"), l.graph);

        let err = assembler.assemble(&groups).unwrap_err();
        assert_eq!(
            err,
            SegpipeError::DuplicateStageName {
                name: "Api".into(),
                first: 3,
                second: 4,
            }
        );
        assert_eq!(assembler.validate(&groups).unwrap_err(), err);

        let renamed = vec![
            SegmentGroup::from(l.source),
            SegmentGroup::from(l.update),
            SegmentGroup::from(l.api),
            SegmentGroup::named("Api-eu", vec![second_api]),
        ];
        assert_eq!(assembler.assemble(&renamed).unwrap().stages.len(), 4);
    }

    #[test]
    fn test_end_to_end_three_stages() {
        let l = layout();
        let groups = vec![
            SegmentGroup::from(l.source),
            SegmentGroup::from(l.update),
            SegmentGroup::from(l.api),
        ];
        let assembler = Assembler::new(PipelineContext::new("Delivery"), l.graph);
        let pipeline = assembler.assemble(&groups).unwrap();

        let names: Vec<&str> = pipeline.stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Source", "Pipeline", "Api"]);

        let counts: Vec<usize> = pipeline.stages.iter().map(|s| s.actions.len()).collect();
        assert_eq!(counts, vec![1, 1, 4]);
        assert_eq!(run_orders(&pipeline.stages[2]), vec![1, 2, 3, 4]);
        assert!(pipeline.restart_execution_on_update);
    }

    #[test]
    fn test_grouped_stage_concatenates_in_declaration_order() {
        let l = layout();
        let groups = vec![
            SegmentGroup::from(l.source),
            SegmentGroup::from(l.update),
            SegmentGroup::from(vec![l.web, l.api]),
        ];
        let pipeline = Assembler::new(PipelineContext::new("Delivery"), l.graph)
            .assemble(&groups)
            .unwrap();

        let stage = &pipeline.stages[2];
        assert_eq!(stage.name, "Web-Api");
        assert_eq!(stage.actions.len(), 7);
        assert_eq!(run_orders(stage), vec![1, 2, 3, 1, 2, 3, 4]);
    }

    #[test]
    fn test_explicit_group_names_win() {
        let l = layout();
        let groups = vec![
            SegmentGroup::named("Checkout", vec![l.source]),
            SegmentGroup::from(l.update),
            SegmentGroup::named("Production", vec![l.api, l.web]),
        ];
        let pipeline = Assembler::new(PipelineContext::new("Delivery"), l.graph)
            .assemble(&groups)
            .unwrap();

        assert_eq!(pipeline.stages[0].name, "Checkout");
        assert_eq!(pipeline.stages[1].name, "Pipeline");
        assert_eq!(pipeline.stages[2].name, "Production");
    }

    #[test]
    fn test_validation_failure_returns_no_pipeline() {
        let l = layout();
        let groups = vec![
            SegmentGroup::from(vec![l.source, l.api]),
            SegmentGroup::from(l.update),
        ];
        let result = Assembler::new(PipelineContext::new("Delivery"), l.graph).assemble(&groups);
        assert!(matches!(result, Err(SegpipeError::MisplacedSource { .. })));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let groups = |l: &Layout| {
            vec![
                SegmentGroup::from(l.source),
                SegmentGroup::from(l.update),
                SegmentGroup::from(vec![l.api, l.web]),
            ]
        };

        let first = layout();
        let first_groups = groups(&first);
        let a = Assembler::new(PipelineContext::new("Delivery"), first.graph)
            .assemble(&first_groups)
            .unwrap();

        let second = layout();
        let second_groups = groups(&second);
        let b = Assembler::new(PipelineContext::new("Delivery"), second.graph)
            .assemble(&second_groups)
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_validate_reports_unplaced_segments() {
        let l = layout();
        let groups = vec![
            SegmentGroup::from(l.source),
            SegmentGroup::from(l.update),
            SegmentGroup::from(l.api),
        ];
        let report = Assembler::new(PipelineContext::new("Delivery"), l.graph)
            .validate(&groups)
            .unwrap();
        assert!(report.warnings.iter().any(|w| w.contains("'Web'")));
    }
}
