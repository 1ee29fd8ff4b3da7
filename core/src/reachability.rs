/// Reachability Engine
///
/// Forward and backward breadth-first traversal over a precomputed
/// id -> neighbour-list map. Both traversals include the start id.
use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::{NodeId, SequenceEdge, SequenceGraph, SequenceNode};

pub type AdjacencyMap = HashMap<NodeId, Vec<NodeId>>;

/// Forward and reverse adjacency built from one snapshot of the edge set
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    pub forward: AdjacencyMap,
    pub reverse: AdjacencyMap,
}

impl Adjacency {
    /// Every present node gets an entry. Edges with an endpoint missing from
    /// `nodes` are skipped.
    pub fn build<'a>(
        nodes: impl IntoIterator<Item = &'a SequenceNode>,
        edges: impl IntoIterator<Item = &'a SequenceEdge>,
    ) -> Self {
        let mut forward = AdjacencyMap::new();
        let mut reverse = AdjacencyMap::new();

        for node in nodes {
            forward.entry(node.id.clone()).or_default();
            reverse.entry(node.id.clone()).or_default();
        }

        for edge in edges {
            if !forward.contains_key(&edge.source) || !forward.contains_key(&edge.target) {
                continue;
            }
            if let Some(targets) = forward.get_mut(&edge.source) {
                targets.push(edge.target.clone());
            }
            if let Some(sources) = reverse.get_mut(&edge.target) {
                sources.push(edge.source.clone());
            }
        }

        Adjacency { forward, reverse }
    }

    pub fn from_graph(graph: &SequenceGraph) -> Self {
        Self::build(graph.nodes(), graph.edges())
    }
}

/// Nodes reachable from `start` following edges forward, `start` included.
///
/// An id absent from the map yields an empty set.
pub fn bfs_reachable(start: &NodeId, forward: &AdjacencyMap) -> HashSet<NodeId> {
    traverse(start, forward)
}

/// Nodes that can reach `end`, `end` included.
pub fn reverse_bfs_reachable(end: &NodeId, reverse: &AdjacencyMap) -> HashSet<NodeId> {
    traverse(end, reverse)
}

fn traverse(start: &NodeId, adjacency: &AdjacencyMap) -> HashSet<NodeId> {
    let mut visited = HashSet::new();
    if !adjacency.contains_key(start) {
        return visited;
    }

    let mut queue = VecDeque::new();
    visited.insert(start.clone());
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in adjacency.get(current).into_iter().flatten() {
            if visited.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &[&str])]) -> AdjacencyMap {
        pairs
            .iter()
            .map(|(k, vs)| (NodeId::from(*k), vs.iter().map(|v| NodeId::from(*v)).collect()))
            .collect()
    }

    fn set(ids: &[&str]) -> HashSet<NodeId> {
        ids.iter().map(|id| NodeId::from(*id)).collect()
    }

    #[test]
    fn test_forward_includes_start() {
        let forward = map(&[("a", &["b"]), ("b", &["c"]), ("c", &[]), ("d", &[])]);
        assert_eq!(bfs_reachable(&"a".into(), &forward), set(&["a", "b", "c"]));
        assert_eq!(bfs_reachable(&"d".into(), &forward), set(&["d"]));
    }

    #[test]
    fn test_absent_start_is_empty() {
        let forward = map(&[("a", &[])]);
        assert!(bfs_reachable(&"zzz".into(), &forward).is_empty());
    }

    #[test]
    fn test_reverse_traversal() {
        let reverse = map(&[("c", &["b"]), ("b", &["a"]), ("a", &[])]);
        assert_eq!(
            reverse_bfs_reachable(&"c".into(), &reverse),
            set(&["a", "b", "c"])
        );
    }

    #[test]
    fn test_build_skips_edges_to_missing_nodes() {
        use crate::geometry::Position;
        use crate::graph::NodeKind;

        let a = SequenceNode::new("a".into(), NodeKind::Part, Position::default());
        let b = SequenceNode::new("b".into(), NodeKind::Part, Position::default());
        let edges = vec![
            SequenceEdge::new("a".into(), "b".into(), "smoothstep"),
            SequenceEdge::new("b".into(), "ghost".into(), "smoothstep"),
        ];

        let adjacency = Adjacency::build([&a, &b], edges.iter());
        assert_eq!(adjacency.forward[&NodeId::from("a")], vec![NodeId::from("b")]);
        assert!(adjacency.forward[&NodeId::from("b")].is_empty());
        assert!(!adjacency.forward.contains_key(&NodeId::from("ghost")));
        assert_eq!(adjacency.reverse[&NodeId::from("b")], vec![NodeId::from("a")]);
    }
}
