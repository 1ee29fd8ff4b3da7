/// Zone Extractor
///
/// A zone is the set of nodes lying on some path from a chosen start node to a
/// chosen end node: everything reachable forward from the start that can also
/// reach the end. The set is computed once, when the zone is created, and stays
/// frozen afterwards. Zones never share nodes.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use tracing::{debug, info};

use crate::geometry::{enclosing_box, BoundingBox, NodeSizeProvider};
use crate::graph::{NodeId, SequenceEdge, SequenceGraph, SequenceNode};
use crate::reachability::{bfs_reachable, reverse_bfs_reachable, Adjacency};

pub const DEFAULT_ZONE_PADDING: f64 = 24.0;

string_id!(
    /// Identifier of a zone
    ZoneId,
    "zone"
);

/// A named, frozen segment of the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub start: NodeId,
    pub end: NodeId,

    #[serde(rename = "nodeIds")]
    pub node_ids: BTreeSet<NodeId>,
}

impl Zone {
    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.node_ids.contains(node_id)
    }
}

/// Result of [`compute_zone_node_set`]
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneNodeSet {
    pub node_ids: BTreeSet<NodeId>,
    pub has_path: bool,
}

/// Why a zone could not be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneRejection {
    NameRequired,
    NoPath,
    /// The candidate shares nodes with this existing zone
    Overlap(ZoneId),
}

impl fmt::Display for ZoneRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneRejection::NameRequired => f.write_str("zone name required"),
            ZoneRejection::NoPath => f.write_str("no path between start and end"),
            ZoneRejection::Overlap(_) => f.write_str("zone overlaps existing zone"),
        }
    }
}

/// Forward reachability from `start` intersected with backward reachability
/// from `end`, restricted to the given nodes.
///
/// An id missing from `nodes` yields an empty set and `has_path = false`.
pub fn compute_zone_node_set<'a>(
    nodes: impl IntoIterator<Item = &'a SequenceNode>,
    edges: impl IntoIterator<Item = &'a SequenceEdge>,
    start: &NodeId,
    end: &NodeId,
) -> ZoneNodeSet {
    let adjacency = Adjacency::build(nodes, edges);
    let forward = bfs_reachable(start, &adjacency.forward);
    let backward = reverse_bfs_reachable(end, &adjacency.reverse);

    let node_ids: BTreeSet<NodeId> = forward.intersection(&backward).cloned().collect();
    let has_path = node_ids.contains(start) && node_ids.contains(end);

    ZoneNodeSet { node_ids, has_path }
}

/// Id of the first zone sharing any node with `candidate`
pub fn detect_zone_overlap<'a>(
    candidate: &BTreeSet<NodeId>,
    zones: impl IntoIterator<Item = &'a Zone>,
) -> Option<ZoneId> {
    zones
        .into_iter()
        .find(|zone| !zone.node_ids.is_disjoint(candidate))
        .map(|zone| zone.id.clone())
}

/// Rectangle covering every resolvable member, expanded by `padding`.
///
/// Unknown ids are skipped; `None` only when none resolve.
pub fn compute_zone_bbox<'a>(
    nodes: impl IntoIterator<Item = &'a SequenceNode>,
    node_ids: &BTreeSet<NodeId>,
    padding: f64,
    sizes: &dyn NodeSizeProvider,
) -> Option<BoundingBox> {
    let members = nodes.into_iter().filter(|node| node_ids.contains(&node.id));
    enclosing_box(members, sizes, padding)
}

/// Owns the zone list
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
    padding: f64,
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_ZONE_PADDING)
    }
}

impl ZoneRegistry {
    pub fn new(padding: f64) -> Self {
        ZoneRegistry {
            zones: Vec::new(),
            padding,
        }
    }

    /// Derive and store a new zone, or say why not
    pub fn create_zone(
        &mut self,
        graph: &SequenceGraph,
        name: &str,
        start: &NodeId,
        end: &NodeId,
    ) -> Result<Zone, ZoneRejection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ZoneRejection::NameRequired);
        }

        let candidate = compute_zone_node_set(graph.nodes(), graph.edges(), start, end);
        if !candidate.has_path {
            debug!("No path from {} to {}", start, end);
            return Err(ZoneRejection::NoPath);
        }

        if let Some(existing) = detect_zone_overlap(&candidate.node_ids, &self.zones) {
            debug!("Zone candidate overlaps {}", existing);
            return Err(ZoneRejection::Overlap(existing));
        }

        let zone = Zone {
            id: ZoneId::generate(),
            name: name.to_string(),
            start: start.clone(),
            end: end.clone(),
            node_ids: candidate.node_ids,
        };
        info!(
            "Created zone '{}' ({}) with {} nodes",
            zone.name,
            zone.id,
            zone.node_ids.len()
        );
        self.zones.push(zone.clone());
        Ok(zone)
    }

    pub fn remove_zone(&mut self, zone_id: &ZoneId) -> Option<Zone> {
        let index = self.zones.iter().position(|zone| &zone.id == zone_id)?;
        Some(self.zones.remove(index))
    }

    /// Forget a deleted node. Zones that lose their start or end go away.
    ///
    /// Returns the ids of dropped zones.
    pub fn prune_node(&mut self, node_id: &NodeId) -> Vec<ZoneId> {
        let mut dropped = Vec::new();
        self.zones.retain_mut(|zone| {
            if &zone.start == node_id || &zone.end == node_id {
                dropped.push(zone.id.clone());
                return false;
            }
            zone.node_ids.remove(node_id);
            true
        });
        if !dropped.is_empty() {
            debug!("Dropped {} zones anchored on {}", dropped.len(), node_id);
        }
        dropped
    }

    pub fn zone(&self, zone_id: &ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| &zone.id == zone_id)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Zone containing `node_id`, if any
    pub fn zone_of(&self, node_id: &NodeId) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.contains(node_id))
    }

    pub fn zone_bbox(
        &self,
        graph: &SequenceGraph,
        zone_id: &ZoneId,
        sizes: &dyn NodeSizeProvider,
    ) -> Option<BoundingBox> {
        let zone = self.zone(zone_id)?;
        compute_zone_bbox(graph.nodes(), &zone.node_ids, self.padding, sizes)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// In-progress zone creation: a name plus start and end picked by clicking nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneDraft {
    pub name: String,
    pub start: Option<NodeId>,
    pub end: Option<NodeId>,
}

impl ZoneDraft {
    pub fn new(name: impl Into<String>) -> Self {
        ZoneDraft {
            name: name.into(),
            start: None,
            end: None,
        }
    }

    /// First pick sets the start, the second sets the end, later picks move the end.
    pub fn pick(&mut self, node_id: NodeId) {
        if self.start.is_none() {
            self.start = Some(node_id);
        } else {
            self.end = Some(node_id);
        }
    }

    pub fn can_create(&self) -> bool {
        !self.name.trim().is_empty() && self.start.is_some() && self.end.is_some()
    }
}
