/// Graph Store for process-sequence graphs
///
/// This module owns the canonical node and edge collections of a sequence: PART
/// and PROCESS nodes placed on a canvas, connected by directed precedence edges.
/// Every mutation is synchronous and atomic. It either applies in full or
/// returns an error and leaves the store untouched.
///
/// Edges only enter the store through the connection validator, so the edge
/// set stays free of self-loops, duplicate pairs and cycles.
///
/// # Examples
///
/// ```rust
/// use sequencer_core::graph::{NodeData, NodeKind, SequenceGraph};
/// use sequencer_core::geometry::Position;
///
/// let mut graph = SequenceGraph::new();
/// let a = graph.add_node(NodeKind::Part, Position::new(0.0, 0.0), NodeData::new()).unwrap();
/// let b = graph.add_node(NodeKind::Process, Position::new(220.0, 0.0), NodeData::new()).unwrap();
///
/// assert!(graph.add_edge(&a.id, &b.id).is_ok());
/// // The reverse edge would close a cycle
/// assert!(graph.add_edge(&b.id, &a.id).is_err());
/// ```
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::errors::{GraphError, GraphResult};
use crate::geometry::{Position, Size};
use crate::validation::{self, ConnectionCheck, ConnectionRejection};

string_id!(
    /// Identifier of a node in the sequence graph
    NodeId,
    "N"
);

string_id!(
    /// Identifier of a precedence edge
    EdgeId,
    "E"
);

impl EdgeId {
    /// Edge ids are derived from their endpoints; one edge exists per ordered pair.
    pub fn for_pair(source: &NodeId, target: &NodeId) -> Self {
        EdgeId(format!("E-{}-{}", source, target))
    }
}

/// Opaque domain payload carried by nodes and edges
pub type NodeData = HashMap<String, serde_json::Value>;

pub const DEFAULT_EDGE_STYLE: &str = "smoothstep";

/// Kind of node on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// A physical part produced in-house
    Part,

    /// A process step applied to parts
    Process,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Part => "PART",
            NodeKind::Process => "PROCESS",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the sequence graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceNode {
    pub id: NodeId,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    pub position: Position,

    /// Size measured by the renderer; `None` until measured
    #[serde(default, rename = "measured", skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,

    #[serde(default)]
    pub data: NodeData,

    #[serde(default = "chrono::Utc::now", rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,

    #[serde(default = "chrono::Utc::now", rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl SequenceNode {
    pub fn new(id: NodeId, kind: NodeKind, position: Position) -> Self {
        let now = chrono::Utc::now();
        SequenceNode {
            id,
            kind,
            position,
            size: None,
            data: NodeData::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a node with a generated id
    pub fn new_auto(kind: NodeKind, position: Position) -> Self {
        Self::new(NodeId::generate(), kind, position)
    }

    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = data;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Read a string field from the data payload
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now();
    }
}

/// A directed precedence edge: `source` must happen before `target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,

    /// Rendering style tag, opaque to the core
    #[serde(rename = "type", default = "default_edge_style")]
    pub style: String,

    #[serde(default)]
    pub data: NodeData,

    #[serde(default = "chrono::Utc::now", rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

fn default_edge_style() -> String {
    DEFAULT_EDGE_STYLE.to_string()
}

impl SequenceEdge {
    pub fn new(source: NodeId, target: NodeId, style: impl Into<String>) -> Self {
        SequenceEdge {
            id: EdgeId::for_pair(&source, &target),
            source,
            target,
            style: style.into(),
            data: NodeData::new(),
            created_at: chrono::Utc::now(),
        }
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }
}

/// What `remove_node` took out of the store
#[derive(Debug, Clone)]
pub struct RemovedNode {
    pub node: SequenceNode,
    pub edges: Vec<SequenceEdge>,
}

/// Why an edge was left out when restoring a store from stored parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    DanglingEndpoint,
    SelfLoop,
    DuplicateId,
    DuplicatePair,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            DropReason::DanglingEndpoint => "endpoint does not exist",
            DropReason::SelfLoop => "self-connection",
            DropReason::DuplicateId => "duplicate edge id",
            DropReason::DuplicatePair => "duplicate connection",
        };
        f.write_str(text)
    }
}

/// An edge rejected by [`SequenceGraph::from_parts`]
#[derive(Debug, Clone)]
pub struct DroppedEdge {
    pub edge: SequenceEdge,
    pub reason: DropReason,
}

/// The Graph Store: nodes, edges and adjacency in insertion order
#[derive(Debug, Clone)]
pub struct SequenceGraph {
    nodes: HashMap<NodeId, SequenceNode>,
    node_order: Vec<NodeId>,

    edges: HashMap<EdgeId, SequenceEdge>,
    edge_order: Vec<EdgeId>,

    /// node_id -> outgoing edge ids
    adjacency_out: HashMap<NodeId, Vec<EdgeId>>,

    /// node_id -> incoming edge ids
    adjacency_in: HashMap<NodeId, Vec<EdgeId>>,

    default_edge_style: String,

    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Default for SequenceGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceGraph {
    pub fn new() -> Self {
        SequenceGraph {
            nodes: HashMap::new(),
            node_order: Vec::new(),
            edges: HashMap::new(),
            edge_order: Vec::new(),
            adjacency_out: HashMap::new(),
            adjacency_in: HashMap::new(),
            default_edge_style: default_edge_style(),
            updated_at: chrono::Utc::now(),
        }
    }

    /// Style tag given to edges created through [`SequenceGraph::add_edge`]
    pub fn with_default_edge_style(mut self, style: impl Into<String>) -> Self {
        self.default_edge_style = style.into();
        self
    }

    /// Restore a store from stored nodes and edges.
    ///
    /// Nodes with an already-seen id are skipped. Edges with a missing endpoint,
    /// a self-loop, a repeated id or a repeated (source, target) pair are
    /// dropped and reported. Cycles are left in place so that `has_cycle` can
    /// report them.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = SequenceNode>,
        edges: impl IntoIterator<Item = SequenceEdge>,
    ) -> (Self, Vec<DroppedEdge>) {
        let mut graph = SequenceGraph::new();
        for node in nodes {
            if let Err(err) = graph.insert_node(node) {
                warn!("Skipping stored node: {}", err);
            }
        }

        let mut dropped = Vec::new();
        for edge in edges {
            let reason = if !graph.contains_node(&edge.source) || !graph.contains_node(&edge.target)
            {
                Some(DropReason::DanglingEndpoint)
            } else if edge.source == edge.target {
                Some(DropReason::SelfLoop)
            } else if graph.edges.contains_key(&edge.id) {
                Some(DropReason::DuplicateId)
            } else if graph.edge_between(&edge.source, &edge.target).is_some() {
                Some(DropReason::DuplicatePair)
            } else {
                None
            };

            match reason {
                Some(reason) => {
                    warn!("Dropping stored edge {}: {}", edge.id, reason);
                    dropped.push(DroppedEdge { edge, reason });
                }
                None => graph.link(edge),
            }
        }

        (graph, dropped)
    }

    /// Insert a fully-formed node, keeping its id
    pub fn insert_node(&mut self, node: SequenceNode) -> GraphResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        if !node.position.is_finite() {
            return Err(GraphError::InvalidPosition(node.id));
        }

        let node_id = node.id.clone();
        self.adjacency_out.insert(node_id.clone(), Vec::new());
        self.adjacency_in.insert(node_id.clone(), Vec::new());
        self.node_order.push(node_id.clone());
        self.nodes.insert(node_id, node);
        self.updated_at = chrono::Utc::now();

        Ok(())
    }

    /// Create a node with a generated id and return a copy of it
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        position: Position,
        data: NodeData,
    ) -> GraphResult<SequenceNode> {
        let node = SequenceNode::new_auto(kind, position).with_data(data);
        self.insert_node(node.clone())?;
        debug!("Added {} node {}", kind, node.id);
        Ok(node)
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, node_id: &NodeId) -> GraphResult<RemovedNode> {
        if !self.nodes.contains_key(node_id) {
            return Err(GraphError::NodeNotFound(node_id.clone()));
        }

        let incoming = self.adjacency_in.get(node_id).cloned().unwrap_or_default();
        let outgoing = self.adjacency_out.get(node_id).cloned().unwrap_or_default();

        let mut removed_edges = Vec::new();
        for edge_id in incoming.iter().chain(outgoing.iter()) {
            if let Some(edge) = self.unlink(edge_id) {
                removed_edges.push(edge);
            }
        }

        self.adjacency_out.remove(node_id);
        self.adjacency_in.remove(node_id);
        self.node_order.retain(|id| id != node_id);
        let node = self
            .nodes
            .remove(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        self.updated_at = chrono::Utc::now();

        debug!(
            "Removed node {} with {} incident edges",
            node_id,
            removed_edges.len()
        );
        Ok(RemovedNode {
            node,
            edges: removed_edges,
        })
    }

    /// Move a node to an absolute position
    pub fn move_node(&mut self, node_id: &NodeId, position: Position) -> GraphResult<()> {
        if !position.is_finite() {
            return Err(GraphError::InvalidPosition(node_id.clone()));
        }
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        node.position = position;
        node.touch();
        self.updated_at = chrono::Utc::now();
        Ok(())
    }

    /// Shift a node by a delta
    pub fn translate_node(&mut self, node_id: &NodeId, dx: f64, dy: f64) -> GraphResult<()> {
        let position = self
            .nodes
            .get(node_id)
            .map(|node| node.position.translated(dx, dy))
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        self.move_node(node_id, position)
    }

    /// Record the size measured by the renderer
    pub fn set_node_size(&mut self, node_id: &NodeId, size: Size) -> GraphResult<()> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        node.size = Some(size);
        Ok(())
    }

    /// Merge `patch` into a node's data payload
    pub fn update_node_data(&mut self, node_id: &NodeId, patch: NodeData) -> GraphResult<()> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        node.data.extend(patch);
        node.touch();
        self.updated_at = chrono::Utc::now();
        Ok(())
    }

    /// Merge `patch` into an edge's data payload
    pub fn update_edge_data(&mut self, edge_id: &EdgeId, patch: NodeData) -> GraphResult<()> {
        let edge = self
            .edges
            .get_mut(edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.clone()))?;
        edge.data.extend(patch);
        self.updated_at = chrono::Utc::now();
        Ok(())
    }

    /// Add a validated edge with the store's default style
    pub fn add_edge(
        &mut self,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<SequenceEdge, ConnectionRejection> {
        let style = self.default_edge_style.clone();
        self.add_edge_with_style(source, target, style)
    }

    /// Add a validated edge. Rejections leave the store unchanged.
    pub fn add_edge_with_style(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        style: impl Into<String>,
    ) -> Result<SequenceEdge, ConnectionRejection> {
        match validation::validate_connection(self, source, target) {
            ConnectionCheck::Rejected(reason) => {
                debug!("Rejected edge {} -> {}: {}", source, target, reason);
                Err(reason)
            }
            ConnectionCheck::Ok => {
                let mut edge = SequenceEdge::new(source.clone(), target.clone(), style);
                if self.edges.contains_key(&edge.id) {
                    // Pair id already used by a different pair, e.g. "a-b"->"c" vs "a"->"b-c"
                    edge.id = self.free_edge_id(&edge.id);
                }
                self.link(edge.clone());
                self.updated_at = chrono::Utc::now();
                debug!("Added edge {}", edge.id);
                Ok(edge)
            }
        }
    }

    /// First of `base-2`, `base-3`, ... not yet used by an edge
    fn free_edge_id(&self, base: &EdgeId) -> EdgeId {
        let mut suffix = 2usize;
        loop {
            let candidate = EdgeId::new(format!("{}-{}", base, suffix));
            if !self.edges.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Remove a single edge
    pub fn remove_edge(&mut self, edge_id: &EdgeId) -> GraphResult<SequenceEdge> {
        let edge = self
            .unlink(edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.clone()))?;
        self.updated_at = chrono::Utc::now();
        debug!("Removed edge {}", edge_id);
        Ok(edge)
    }

    fn link(&mut self, edge: SequenceEdge) {
        let edge_id = edge.id.clone();
        self.adjacency_out
            .entry(edge.source.clone())
            .or_default()
            .push(edge_id.clone());
        self.adjacency_in
            .entry(edge.target.clone())
            .or_default()
            .push(edge_id.clone());
        self.edge_order.push(edge_id.clone());
        self.edges.insert(edge_id, edge);
    }

    fn unlink(&mut self, edge_id: &EdgeId) -> Option<SequenceEdge> {
        let edge = self.edges.remove(edge_id)?;
        if let Some(out_edges) = self.adjacency_out.get_mut(&edge.source) {
            out_edges.retain(|e| e != edge_id);
        }
        if let Some(in_edges) = self.adjacency_in.get_mut(&edge.target) {
            in_edges.retain(|e| e != edge_id);
        }
        self.edge_order.retain(|e| e != edge_id);
        Some(edge)
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&SequenceNode> {
        self.nodes.get(node_id)
    }

    pub fn edge(&self, edge_id: &EdgeId) -> Option<&SequenceEdge> {
        self.edges.get(edge_id)
    }

    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn contains_edge(&self, edge_id: &EdgeId) -> bool {
        self.edges.contains_key(edge_id)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &SequenceNode> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &SequenceEdge> {
        self.edge_order.iter().filter_map(|id| self.edges.get(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The edge from `source` to `target`, if any
    pub fn edge_between(&self, source: &NodeId, target: &NodeId) -> Option<&SequenceEdge> {
        self.outgoing_edges(source)
            .into_iter()
            .find(|edge| &edge.target == target)
    }

    pub fn outgoing_edges(&self, node_id: &NodeId) -> Vec<&SequenceEdge> {
        self.adjacency_out
            .get(node_id)
            .map(|edge_ids| edge_ids.iter().filter_map(|eid| self.edges.get(eid)).collect())
            .unwrap_or_default()
    }

    pub fn incoming_edges(&self, node_id: &NodeId) -> Vec<&SequenceEdge> {
        self.adjacency_in
            .get(node_id)
            .map(|edge_ids| edge_ids.iter().filter_map(|eid| self.edges.get(eid)).collect())
            .unwrap_or_default()
    }

    pub fn successors(&self, node_id: &NodeId) -> Vec<&NodeId> {
        self.outgoing_edges(node_id)
            .into_iter()
            .map(|edge| &edge.target)
            .collect()
    }

    pub fn predecessors(&self, node_id: &NodeId) -> Vec<&NodeId> {
        self.incoming_edges(node_id)
            .into_iter()
            .map(|edge| &edge.source)
            .collect()
    }

    /// Whole-graph cycle check, for stores restored from documents
    pub fn has_cycle(&self) -> bool {
        validation::graph_has_cycle(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(n: usize) -> (SequenceGraph, Vec<NodeId>) {
        let mut graph = SequenceGraph::new();
        let ids = (0..n)
            .map(|i| {
                graph
                    .add_node(
                        NodeKind::Process,
                        Position::new(i as f64 * 220.0, 0.0),
                        NodeData::new(),
                    )
                    .unwrap()
                    .id
            })
            .collect();
        (graph, ids)
    }

    #[test]
    fn test_add_nodes_keeps_insertion_order() {
        let (graph, ids) = graph_with(3);
        let listed: Vec<_> = graph.nodes().map(|n| n.id.clone()).collect();
        assert_eq!(listed, ids);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut graph = SequenceGraph::new();
        let node = SequenceNode::new(NodeId::new("N-1"), NodeKind::Part, Position::default());
        graph.insert_node(node.clone()).unwrap();
        assert!(matches!(
            graph.insert_node(node),
            Err(GraphError::DuplicateNode(_))
        ));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_non_finite_position_rejected() {
        let (mut graph, ids) = graph_with(1);
        let before = graph.node(&ids[0]).unwrap().position;
        assert!(matches!(
            graph.move_node(&ids[0], Position::new(f64::NAN, 0.0)),
            Err(GraphError::InvalidPosition(_))
        ));
        assert_eq!(graph.node(&ids[0]).unwrap().position, before);
    }

    #[test]
    fn test_add_edge_uses_pair_id_and_default_style() {
        let (mut graph, ids) = graph_with(2);
        let edge = graph.add_edge(&ids[0], &ids[1]).unwrap();
        assert_eq!(edge.id, EdgeId::for_pair(&ids[0], &ids[1]));
        assert_eq!(edge.style, DEFAULT_EDGE_STYLE);
        assert_eq!(graph.successors(&ids[0]), vec![&ids[1]]);
        assert_eq!(graph.predecessors(&ids[1]), vec![&ids[0]]);
    }

    #[test]
    fn test_colliding_pair_id_gets_suffix() {
        let mut graph = SequenceGraph::new();
        for name in ["a-b", "c", "a", "b-c"] {
            let node = SequenceNode::new(NodeId::from(name), NodeKind::Process, Position::new(0.0, 0.0));
            graph.insert_node(node).unwrap();
        }

        let first = graph.add_edge(&"a-b".into(), &"c".into()).unwrap();
        let second = graph.add_edge(&"a".into(), &"b-c".into()).unwrap();

        assert_eq!(first.id.as_str(), "E-a-b-c");
        assert_eq!(second.id.as_str(), "E-a-b-c-2");
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edge(&second.id).unwrap().source, NodeId::from("a"));
        assert!(graph.edge_between(&"a".into(), &"b-c".into()).is_some());
    }

    #[test]
    fn test_rejected_edge_leaves_store_unchanged() {
        let (mut graph, ids) = graph_with(2);
        graph.add_edge(&ids[0], &ids[1]).unwrap();

        assert_eq!(
            graph.add_edge(&ids[1], &ids[0]).unwrap_err(),
            ConnectionRejection::CycleForbidden
        );
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.successors(&ids[1]).is_empty());
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let (mut graph, ids) = graph_with(3);
        graph.add_edge(&ids[0], &ids[1]).unwrap();
        graph.add_edge(&ids[1], &ids[2]).unwrap();

        let removed = graph.remove_node(&ids[1]).unwrap();
        assert_eq!(removed.edges.len(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.successors(&ids[0]).is_empty());
        assert!(graph.predecessors(&ids[2]).is_empty());
        assert!(matches!(
            graph.remove_node(&ids[1]),
            Err(GraphError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_remove_edge() {
        let (mut graph, ids) = graph_with(2);
        let edge = graph.add_edge(&ids[0], &ids[1]).unwrap();
        graph.remove_edge(&edge.id).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.edge_between(&ids[0], &ids[1]).is_none());
        assert!(matches!(
            graph.remove_edge(&edge.id),
            Err(GraphError::EdgeNotFound(_))
        ));
        // The pair can be linked again once the old edge is gone
        assert!(graph.add_edge(&ids[0], &ids[1]).is_ok());
    }

    #[test]
    fn test_update_node_data_merges() {
        let (mut graph, ids) = graph_with(1);
        let mut patch = NodeData::new();
        patch.insert("option".into(), serde_json::json!("A"));
        graph.update_node_data(&ids[0], patch).unwrap();

        let mut patch = NodeData::new();
        patch.insert("repeatWeight".into(), serde_json::json!(2));
        graph.update_node_data(&ids[0], patch).unwrap();

        let node = graph.node(&ids[0]).unwrap();
        assert_eq!(node.data_str("option"), Some("A"));
        assert_eq!(node.data.get("repeatWeight"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn test_from_parts_drops_bad_edges() {
        let a = SequenceNode::new(NodeId::new("a"), NodeKind::Part, Position::default());
        let b = SequenceNode::new(NodeId::new("b"), NodeKind::Process, Position::default());
        let good = SequenceEdge::new(a.id.clone(), b.id.clone(), "smoothstep");
        let mut repeat = SequenceEdge::new(a.id.clone(), b.id.clone(), "smoothstep");
        repeat.id = EdgeId::new("other");
        let dangling = SequenceEdge::new(a.id.clone(), NodeId::new("ghost"), "smoothstep");
        let looped = SequenceEdge::new(b.id.clone(), b.id.clone(), "smoothstep");

        let (graph, dropped) =
            SequenceGraph::from_parts(vec![a, b], vec![good, repeat, dangling, looped]);

        assert_eq!(graph.edge_count(), 1);
        let reasons: Vec<_> = dropped.iter().map(|d| d.reason).collect();
        assert_eq!(
            reasons,
            vec![
                DropReason::DuplicatePair,
                DropReason::DanglingEndpoint,
                DropReason::SelfLoop
            ]
        );
    }

    #[test]
    fn test_from_parts_keeps_cycles_for_reporting() {
        let a = SequenceNode::new(NodeId::new("a"), NodeKind::Part, Position::default());
        let b = SequenceNode::new(NodeId::new("b"), NodeKind::Part, Position::default());
        let ab = SequenceEdge::new(a.id.clone(), b.id.clone(), "smoothstep");
        let ba = SequenceEdge::new(b.id.clone(), a.id.clone(), "smoothstep");

        let (graph, dropped) = SequenceGraph::from_parts(vec![a, b], vec![ab, ba]);
        assert!(dropped.is_empty());
        assert!(graph.has_cycle());
    }

    #[test]
    fn test_node_serializes_with_wire_names() {
        let node = SequenceNode::new(NodeId::new("N-1"), NodeKind::Process, Position::new(1.0, 2.0));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], "N-1");
        assert_eq!(json["type"], "PROCESS");
        assert!(json.get("measured").is_none());
    }
}
