/// Spatial Group Engine
///
/// Groups are user-made clusters of at least two nodes, drawn as a padded box
/// around their members. Membership follows geometry: when a node drag ends,
/// the node joins whichever group box its center lands in, or leaves its group
/// when it lands in none. Groups that fall below two members dissolve.
///
/// # Lifecycle
///
/// ```text
/// non-existent --create (>=2)--> active --membership change--> active
///                                  |
///                                  +--(< 2 members)--> dissolved
/// ```
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::geometry::{enclosing_box, node_center, BoundingBox, NodeSizeProvider, Position};
use crate::graph::{NodeId, SequenceGraph, SequenceNode};

pub const DEFAULT_GROUP_PADDING: f64 = 16.0;
pub const DEFAULT_GROUP_LABEL_PREFIX: &str = "그룹";

/// Groups need at least this many members to exist
pub const MIN_GROUP_SIZE: usize = 2;

string_id!(
    /// Identifier of a group
    GroupId,
    "grp"
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub label: String,

    /// Members in the order they joined
    #[serde(rename = "nodeIds")]
    pub node_ids: Vec<NodeId>,
}

impl Group {
    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.node_ids.contains(node_id)
    }

    fn detach(&mut self, node_id: &NodeId) -> bool {
        let before = self.node_ids.len();
        self.node_ids.retain(|id| id != node_id);
        self.node_ids.len() != before
    }
}

/// Membership changes produced by a drag-stop recompute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MembershipChange {
    pub joined: Vec<(NodeId, GroupId)>,
    pub left: Vec<(NodeId, GroupId)>,
    pub dissolved: Vec<GroupId>,
}

impl MembershipChange {
    pub fn is_empty(&self) -> bool {
        self.joined.is_empty() && self.left.is_empty() && self.dissolved.is_empty()
    }
}

/// A node whose drag just ended, with the position the drag started from
#[derive(Debug, Clone, PartialEq)]
pub struct DragStop {
    pub node_id: NodeId,
    pub origin: Position,
}

impl DragStop {
    pub fn new(node_id: NodeId, origin: Position) -> Self {
        DragStop { node_id, origin }
    }
}

/// Uncommitted label text for the one group being renamed
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEdit {
    pub group: GroupId,
    pub draft: String,
}

#[derive(Debug, Clone)]
pub struct GroupRegistry {
    groups: Vec<Group>,
    label_prefix: String,
    padding: f64,
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_LABEL_PREFIX, DEFAULT_GROUP_PADDING)
    }
}

impl GroupRegistry {
    pub fn new(label_prefix: impl Into<String>, padding: f64) -> Self {
        GroupRegistry {
            groups: Vec::new(),
            label_prefix: label_prefix.into(),
            padding,
        }
    }

    /// Restore groups from a document, dropping ids the graph no longer has
    /// and groups left with fewer than two members.
    pub fn from_groups(
        mut self,
        groups: impl IntoIterator<Item = Group>,
        graph: &SequenceGraph,
    ) -> Self {
        for mut group in groups {
            let mut seen = Vec::new();
            group.node_ids.retain(|id| {
                let keep = graph.contains_node(id)
                    && !seen.contains(id)
                    && self.group_of(id).is_none();
                if keep {
                    seen.push(id.clone());
                }
                keep
            });
            if group.node_ids.len() >= MIN_GROUP_SIZE {
                self.groups.push(group);
            } else {
                debug!("Dropping stored group {}: too few members", group.id);
            }
        }
        self
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, group_id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == group_id)
    }

    /// The group `node_id` belongs to, if any
    pub fn group_of(&self, node_id: &NodeId) -> Option<&Group> {
        self.groups.iter().find(|g| g.contains(node_id))
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group the selected nodes. Fewer than two existing ids is a no-op.
    ///
    /// Members are taken out of any group they were in before, which may
    /// dissolve that group.
    pub fn create_from_selection(
        &mut self,
        graph: &SequenceGraph,
        selected: &[NodeId],
    ) -> Option<GroupId> {
        let mut members: Vec<NodeId> = Vec::new();
        for id in selected {
            if graph.contains_node(id) && !members.contains(id) {
                members.push(id.clone());
            }
        }
        if members.len() < MIN_GROUP_SIZE {
            return None;
        }

        let label = format!("{} {}", self.label_prefix, self.groups.len() + 1);
        for member in &members {
            for group in self.groups.iter_mut() {
                group.detach(member);
            }
        }
        self.dissolve_small();

        let group = Group {
            id: GroupId::generate(),
            label,
            node_ids: members,
        };
        info!(
            "Created group '{}' with {} members",
            group.label,
            group.node_ids.len()
        );
        let id = group.id.clone();
        self.groups.push(group);
        Some(id)
    }

    /// Set a group's label. Returns false when the group does not exist.
    pub fn rename(&mut self, group_id: &GroupId, label: impl Into<String>) -> bool {
        match self.groups.iter_mut().find(|g| &g.id == group_id) {
            Some(group) => {
                group.label = label.into();
                true
            }
            None => false,
        }
    }

    /// Remove a group. Its members stay in the graph, ungrouped.
    pub fn delete(&mut self, group_id: &GroupId) -> Option<Group> {
        let index = self.groups.iter().position(|g| &g.id == group_id)?;
        Some(self.groups.remove(index))
    }

    /// Move every member by (dx, dy). Membership is not re-evaluated.
    ///
    /// Returns the number of members moved.
    pub fn translate(
        &self,
        graph: &mut SequenceGraph,
        group_id: &GroupId,
        dx: f64,
        dy: f64,
    ) -> usize {
        let Some(group) = self.group(group_id) else {
            return 0;
        };
        group
            .node_ids
            .iter()
            .filter(|id| graph.translate_node(id, dx, dy).is_ok())
            .count()
    }

    pub fn group_bbox(
        &self,
        graph: &SequenceGraph,
        group_id: &GroupId,
        sizes: &dyn NodeSizeProvider,
    ) -> Option<BoundingBox> {
        let group = self.group(group_id)?;
        enclosing_box(
            group.node_ids.iter().filter_map(|id| graph.node(id)),
            sizes,
            self.padding,
        )
    }

    /// Box of `group` with the dragged node put back where its drag started
    fn box_before_drag(
        &self,
        graph: &SequenceGraph,
        group: &Group,
        stop: &DragStop,
        sizes: &dyn NodeSizeProvider,
    ) -> Option<BoundingBox> {
        let members: Vec<SequenceNode> = group
            .node_ids
            .iter()
            .filter_map(|id| graph.node(id))
            .map(|node| {
                let mut node = node.clone();
                if node.id == stop.node_id {
                    node.position = stop.origin;
                }
                node
            })
            .collect();
        enclosing_box(&members, sizes, self.padding)
    }

    /// Recompute membership for nodes whose drag just ended, in event order.
    ///
    /// A node joins the group whose current box contains its center. Its own
    /// group's box is taken with the node at its drag origin, so it leaves only
    /// when dropped outside the box as it stood. With several candidates the
    /// smallest box wins, ties going to the earlier group. Groups left with
    /// fewer than two members are dissolved after the whole batch.
    pub fn on_nodes_drag_stop(
        &mut self,
        graph: &SequenceGraph,
        sizes: &dyn NodeSizeProvider,
        stops: &[DragStop],
    ) -> MembershipChange {
        let mut change = MembershipChange::default();

        for stop in stops {
            let node_id = &stop.node_id;
            let Some(node) = graph.node(node_id) else {
                continue;
            };
            let center = node_center(node, sizes);

            let mut target: Option<(usize, f64)> = None;
            for (index, group) in self.groups.iter().enumerate() {
                let Some(bbox) = self.box_before_drag(graph, group, stop, sizes) else {
                    continue;
                };
                if !bbox.contains(center) {
                    continue;
                }
                let area = bbox.area();
                if target.map_or(true, |(_, best)| area < best) {
                    target = Some((index, area));
                }
            }

            let target_id = target.map(|(index, _)| self.groups[index].id.clone());
            let previous = self.group_of(node_id).map(|g| g.id.clone());
            if previous == target_id {
                continue;
            }

            for group in self.groups.iter_mut() {
                if Some(&group.id) != target_id.as_ref() && group.detach(node_id) {
                    change.left.push((node_id.clone(), group.id.clone()));
                }
            }
            if let Some(target_id) = target_id {
                if let Some(group) = self.groups.iter_mut().find(|g| g.id == target_id) {
                    group.node_ids.push(node_id.clone());
                    change.joined.push((node_id.clone(), target_id));
                }
            }
        }

        change.dissolved = self.dissolve_small();
        if !change.is_empty() {
            debug!(
                "Group recompute: {} joined, {} left, {} dissolved",
                change.joined.len(),
                change.left.len(),
                change.dissolved.len()
            );
        }
        change
    }

    /// Forget a deleted node, dissolving groups that drop below two members
    pub fn prune_node(&mut self, node_id: &NodeId) -> Vec<GroupId> {
        for group in self.groups.iter_mut() {
            group.detach(node_id);
        }
        self.dissolve_small()
    }

    fn dissolve_small(&mut self) -> Vec<GroupId> {
        let mut dissolved = Vec::new();
        self.groups.retain(|group| {
            if group.node_ids.len() < MIN_GROUP_SIZE {
                dissolved.push(group.id.clone());
                false
            } else {
                true
            }
        });
        for id in &dissolved {
            debug!("Dissolved group {}", id);
        }
        dissolved
    }
}
