// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Segment dependency graph
//!
//! Projects the artifact registry into a petgraph DAG whose nodes are
//! segments and whose edges are artifacts flowing from producer to
//! consumer. Used for inspection and rendering; assembly order comes from
//! the declared groups, not from this graph.

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::BTreeMap;

use crate::artifact::{ArtifactGraph, SegmentId};
use crate::errors::{SegpipeError, SegpipeResult};
use crate::segment::SegmentKind;

/// Node payload: one segment
#[derive(Debug, Clone)]
struct SegmentNode {
    id: SegmentId,
    label: String,
    kind: SegmentKind,
}

/// Segment DAG built from an [`ArtifactGraph`]
pub struct SegmentDag {
    graph: DiGraph<SegmentNode, String>,
    index: BTreeMap<SegmentId, NodeIndex>,
}

impl SegmentDag {
    /// Build the DAG from every registered segment and producer edge
    pub fn build(artifacts: &ArtifactGraph) -> Self {
        let mut graph = DiGraph::new();
        let mut index = BTreeMap::new();

        for (id, segment) in artifacts.segments() {
            let node = graph.add_node(SegmentNode {
                id,
                label: segment.label(),
                kind: segment.kind(),
            });
            index.insert(id, node);
        }

        for (producer, consumer, artifact) in artifacts.edges() {
            if let (Some(from), Some(to)) = (index.get(&producer), index.get(&consumer)) {
                graph.add_edge(*from, *to, artifacts.artifact_name(artifact));
            }
        }

        Self { graph, index }
    }

    pub fn segment_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Segments ordered so every producer precedes its consumers
    pub fn topological_order(&self) -> SegpipeResult<Vec<SegmentId>> {
        toposort(&self.graph, None)
            .map(|nodes| nodes.into_iter().map(|n| self.graph[n].id).collect())
            .map_err(|cycle| SegpipeError::CircularDependency {
                segments: self.cycle_members(cycle.node_id()),
            })
    }

    /// Labels of the segments on a cycle through `start`
    fn cycle_members(&self, start: NodeIndex) -> Vec<String> {
        let mut members: Vec<String> = self
            .graph
            .node_indices()
            .filter(|n| {
                *n == start
                    || (has_path_connecting(&self.graph, start, *n, None)
                        && has_path_connecting(&self.graph, *n, start, None))
            })
            .map(|n| self.graph[n].label.clone())
            .collect();
        members.sort();
        members
    }

    /// Segments producing an artifact `segment` consumes
    pub fn upstream(&self, segment: SegmentId) -> Vec<SegmentId> {
        self.neighbors(segment, Direction::Incoming)
    }

    /// Segments consuming an artifact `segment` produces
    pub fn downstream(&self, segment: SegmentId) -> Vec<SegmentId> {
        self.neighbors(segment, Direction::Outgoing)
    }

    fn neighbors(&self, segment: SegmentId, direction: Direction) -> Vec<SegmentId> {
        let Some(node) = self.index.get(&segment) else {
            return Vec::new();
        };
        let mut ids: Vec<SegmentId> = self
            .graph
            .neighbors_directed(*node, direction)
            .map(|n| self.graph[n].id)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Whether `a` depends, directly or transitively, on `b`
    pub fn depends_on(&self, a: SegmentId, b: SegmentId) -> bool {
        match (self.index.get(&a), self.index.get(&b)) {
            (Some(a), Some(b)) => a != b && has_path_connecting(&self.graph, *b, *a, None),
            _ => false,
        }
    }

    fn node_id(&self, node: NodeIndex) -> String {
        format!("s{}", self.graph[node].id.index())
    }

    /// Generate Mermaid diagram of the DAG
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph TD\n");

        for node in self.index.values() {
            out.push_str(&format!(
                "    {}[\"{}\"]\n",
                self.node_id(*node),
                self.graph[*node].label
            ));
        }

        for edge in self.graph.edge_references() {
            out.push_str(&format!(
                "    {} -->|{}| {}\n",
                self.node_id(edge.source()),
                edge.weight(),
                self.node_id(edge.target())
            ));
        }

        out
    }

    /// Generate DOT diagram of the DAG
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for node in self.index.values() {
            let data = &self.graph[*node];
            out.push_str(&format!(
                "    {} [label=\"{}\\n({})\"];\n",
                self.node_id(*node),
                data.label,
                data.kind
            ));
        }
        out.push('\n');

        for edge in self.graph.edge_references() {
            out.push_str(&format!(
                "    {} -> {} [label=\"{}\"];\n",
                self.node_id(edge.source()),
                self.node_id(edge.target()),
                edge.weight()
            ));
        }

        out.push_str("}\n");
        out
    }

    /// Generate text representation in dependency order
    pub fn to_text(&self) -> SegpipeResult<String> {
        let order = self.topological_order()?;
        let mut out = String::new();

        for (i, id) in order.iter().enumerate() {
            let node = self.index[id];
            let data = &self.graph[node];
            out.push_str(&format!("{}. {} ({})", i + 1, data.label, data.kind));

            let inputs: Vec<String> = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| format!("{} from {}", e.weight(), self.graph[e.source()].label))
                .collect();
            if !inputs.is_empty() {
                out.push_str(&format!(" [consumes: {}]", inputs.join(", ")));
            }

            out.push('\n');
        }

        Ok(out)
    }
}
