use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use xref_patterns::ReferenceKind;
use xref_validator::ResolvedReference;

/// Node in the reference graph: a corpus file or a canonical-ID target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Root-relative path or canonical ID text
    pub label: String,
}

/// Directed edge source file → target-or-ID, with a validity flag. Used only
/// for the reporting/visualization hand-off; no cycle semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceGraphEdge {
    pub kind: ReferenceKind,
    pub valid: bool,
}

/// Reference graph over one run's resolution results.
pub struct ReferenceGraph {
    pub graph: DiGraph<GraphNode, ReferenceGraphEdge>,
    node_index: HashMap<String, NodeIndex>,
}

/// Flat, serializable rendering for external visualizers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<ExportedEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedEdge {
    pub source: String,
    pub target: String,
    pub kind: ReferenceKind,
    pub valid: bool,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Build the graph from per-file resolution results. External references
    /// are left out: they carry no corpus target to point at.
    pub fn from_results(per_file: &[(PathBuf, Vec<ResolvedReference>)]) -> Self {
        let mut graph = Self::new();
        for (source, refs) in per_file {
            let source_label = source.to_string_lossy().to_string();
            for resolved in refs {
                if resolved.raw.is_external() {
                    continue;
                }
                let target_label = match &resolved.resolved_target {
                    Some(target) => target.relative_path.to_string_lossy().to_string(),
                    None => resolved.raw.target.clone(),
                };
                graph.add_edge(
                    &source_label,
                    &target_label,
                    ReferenceGraphEdge {
                        kind: resolved.raw.kind,
                        valid: resolved.is_valid(),
                    },
                );
            }
        }
        graph
    }

    fn node(&mut self, label: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(label) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode {
            label: label.to_string(),
        });
        self.node_index.insert(label.to_string(), idx);
        idx
    }

    pub fn add_edge(&mut self, source: &str, target: &str, edge: ReferenceGraphEdge) {
        let from = self.node(source);
        let to = self.node(target);
        self.graph.add_edge(from, to, edge);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn export(&self) -> GraphExport {
        let nodes = self.graph.node_weights().cloned().collect();
        let edges = self
            .graph
            .edge_indices()
            .filter_map(|idx| {
                let (from, to) = self.graph.edge_endpoints(idx)?;
                let edge = self.graph.edge_weight(idx)?;
                Some(ExportedEdge {
                    source: self.graph[from].label.clone(),
                    target: self.graph[to].label.clone(),
                    kind: edge.kind,
                    valid: edge.valid,
                })
            })
            .collect();
        GraphExport { nodes, edges }
    }
}

impl Default for ReferenceGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xref_patterns::RawReference;
    use xref_validator::ResolutionStatus;

    fn result(source: &str, target: &str, status: ResolutionStatus) -> (PathBuf, Vec<ResolvedReference>) {
        (
            PathBuf::from(source),
            vec![ResolvedReference {
                raw: RawReference {
                    source_file: PathBuf::from(source),
                    display_text: "text".into(),
                    target: target.into(),
                    kind: ReferenceKind::MarkdownLink,
                    span: 0..1,
                    target_span: 0..1,
                },
                status,
                resolved_target: None,
                suggestion: None,
            }],
        )
    }

    #[test]
    fn shared_targets_collapse_into_one_node() {
        let results = vec![
            result("a.md", "common.md", ResolutionStatus::Valid),
            result("b.md", "common.md", ResolutionStatus::Valid),
        ];
        let graph = ReferenceGraph::from_results(&results);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn export_carries_validity_flags() {
        let results = vec![result("a.md", "gone.md", ResolutionStatus::TargetNotFound)];
        let export = ReferenceGraph::from_results(&results).export();

        assert_eq!(export.edges.len(), 1);
        assert_eq!(export.edges[0].source, "a.md");
        assert_eq!(export.edges[0].target, "gone.md");
        assert!(!export.edges[0].valid);
    }
}
