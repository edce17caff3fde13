use super::branch::BranchTag;
use crate::values::ValueId;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeLabel {
    pub variable: String,
    pub tag: BranchTag,
}

impl EdgeLabel {
    pub fn new(variable: impl Into<String>, tag: BranchTag) -> Self {
        Self {
            variable: variable.into(),
            tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: ValueId,
    pub to: ValueId,
    pub label: EdgeLabel,
}

/// Directed dataflow edges in creation order. Duplicates are kept: each edge
/// is one flow occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataflowGraph {
    edges: Vec<Edge>,
}

impl DataflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, from: ValueId, to: ValueId, label: EdgeLabel) {
        self.edges.push(Edge { from, to, label });
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges_from(&self, value: ValueId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |e| e.from == value)
    }

    pub fn edges_into(&self, value: ValueId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |e| e.to == value)
    }

    pub fn edges_labeled<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.label.variable == variable)
    }

    /// Every value that data from `value` can reach, in breadth-first order.
    /// `value` itself is only included if it lies on a cycle.
    pub fn reachable_from(&self, value: ValueId) -> Vec<ValueId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(value);

        while let Some(current) = queue.pop_front() {
            for edge in self.edges_from(current) {
                if visited.insert(edge.to) {
                    order.push(edge.to);
                    queue.push_back(edge.to);
                }
            }
        }

        order
    }

    pub fn flows_to(&self, from: ValueId, to: ValueId) -> bool {
        self.reachable_from(from).contains(&to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{InstId, SyntheticId};

    fn v(n: u32) -> ValueId {
        ValueId::Inst(InstId(n))
    }

    fn s(n: u32) -> ValueId {
        ValueId::Synthetic(SyntheticId(n))
    }

    #[test]
    fn duplicates_are_kept() {
        let mut graph = DataflowGraph::new();
        let label = EdgeLabel::new("t", BranchTag::Common);
        graph.add_edge(v(0), s(0), label.clone());
        graph.add_edge(v(0), s(0), label);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edges_from(v(0)).count(), 2);
    }

    #[test]
    fn reachability_follows_hubs() {
        let mut graph = DataflowGraph::new();
        graph.add_edge(v(0), s(0), EdgeLabel::new("t", BranchTag::Inhibit));
        graph.add_edge(s(0), v(1), EdgeLabel::new("t", BranchTag::Common));
        graph.add_edge(v(1), s(1), EdgeLabel::new("u", BranchTag::Common));
        graph.add_edge(s(1), v(2), EdgeLabel::new("u", BranchTag::Common));

        assert_eq!(graph.reachable_from(v(0)), vec![s(0), v(1), s(1), v(2)]);
        assert!(graph.flows_to(v(0), v(2)));
        assert!(!graph.flows_to(v(2), v(0)));
        assert_eq!(graph.edges_labeled("u").count(), 2);
        assert_eq!(graph.edges_into(v(1)).count(), 1);
    }

    #[test]
    fn cycles_terminate() {
        let mut graph = DataflowGraph::new();
        graph.add_edge(v(0), v(1), EdgeLabel::new("a", BranchTag::Common));
        graph.add_edge(v(1), v(0), EdgeLabel::new("a", BranchTag::Common));

        assert_eq!(graph.reachable_from(v(0)), vec![v(1), v(0)]);
    }
}
