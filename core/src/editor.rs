/// Sequence Editor
///
/// The owned aggregate every gesture handler works on: the graph store, the
/// group and zone registries, selection, interaction state and the queue of
/// user-facing notices. Operations here keep the derived collections in step
/// with the graph, e.g. deleting a node also prunes it from groups and zones.
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::CanvasConfig;
use crate::document::{SequenceDocument, StoredNode};
use crate::errors::{GraphError, GraphResult};
use crate::geometry::{BoundingBox, MeasuredOrDefault, Position};
use crate::graph::{
    EdgeId, NodeData, NodeId, NodeKind, RemovedNode, SequenceEdge, SequenceGraph,
};
use crate::group::{GroupId, GroupRegistry};
use crate::interaction::InteractionState;
use crate::palette::{
    node_data_from_template, option_lookup_key, repeat_weight_patch, OptionResolver,
    PaletteTemplate, KEY_NOTE, KEY_OPTION,
};
use crate::validation::ConnectionRejection;
use crate::zone::{Zone, ZoneDraft, ZoneId, ZoneRegistry, ZoneRejection};

/// A non-fatal message for the user, e.g. why an edge was refused
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Notice {
            message: message.into(),
            created_at: chrono::Utc::now(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Current node and edge selection. At most one of the two is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub nodes: Vec<NodeId>,
    pub edge: Option<EdgeId>,
}

impl Selection {
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edge = None;
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edge.is_none()
    }

    pub fn select_node(&mut self, node_id: NodeId) {
        self.nodes = vec![node_id];
        self.edge = None;
    }

    /// Add or remove a node from the multi-selection
    pub fn toggle_node(&mut self, node_id: NodeId) -> bool {
        self.edge = None;
        if let Some(index) = self.nodes.iter().position(|id| id == &node_id) {
            self.nodes.remove(index);
            false
        } else {
            self.nodes.push(node_id);
            true
        }
    }

    pub fn select_edge(&mut self, edge_id: EdgeId) {
        self.nodes.clear();
        self.edge = Some(edge_id);
    }
}

/// Why an option choice was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionRejection {
    /// The node lacks partBase or sourceSheet, so no options resolve
    NoLookupKey,
    NotOffered(String),
}

impl fmt::Display for OptionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionRejection::NoLookupKey => f.write_str("node has no option source"),
            OptionRejection::NotOffered(option) => write!(f, "option not offered: {}", option),
        }
    }
}

pub struct SequenceEditor {
    pub bom_id: String,
    pub spec: String,

    pub(crate) graph: SequenceGraph,
    pub(crate) groups: GroupRegistry,
    pub(crate) zones: ZoneRegistry,
    pub(crate) selection: Selection,
    pub(crate) interaction: InteractionState,
    notices: Vec<Notice>,
    sizes: MeasuredOrDefault,
    canvas: CanvasConfig,
}

impl SequenceEditor {
    pub fn new(bom_id: impl Into<String>, spec: impl Into<String>, canvas: &CanvasConfig) -> Self {
        SequenceEditor {
            bom_id: bom_id.into(),
            spec: spec.into(),
            graph: SequenceGraph::new().with_default_edge_style(canvas.default_edge_style.clone()),
            groups: GroupRegistry::new(canvas.group_label_prefix.clone(), canvas.group_padding),
            zones: ZoneRegistry::new(canvas.zone_padding),
            selection: Selection::default(),
            interaction: InteractionState::Idle,
            notices: Vec::new(),
            sizes: canvas.size_provider(),
            canvas: canvas.clone(),
        }
    }

    /// Restore an editor from a saved document.
    ///
    /// Unusable edges and group members are dropped with a notice; a cyclic
    /// edge set is kept but reported.
    pub fn from_document(document: SequenceDocument, canvas: &CanvasConfig) -> Self {
        let mut editor = SequenceEditor::new(&document.bom_id, &document.spec, canvas);
        let nodes = document.live_nodes();

        let (graph, dropped) = SequenceGraph::from_parts(nodes, document.edges);
        editor.graph = graph.with_default_edge_style(canvas.default_edge_style.clone());
        for dropped_edge in &dropped {
            editor.notify(format!(
                "dropped edge {}: {}",
                dropped_edge.edge.id, dropped_edge.reason
            ));
        }
        if editor.graph.has_cycle() {
            warn!("Loaded sequence {}/{} contains a cycle", editor.bom_id, editor.spec);
            editor.notify("loaded sequence contains a cycle");
        }

        let stored_groups = document.groups.len();
        editor.groups = GroupRegistry::new(canvas.group_label_prefix.clone(), canvas.group_padding)
            .from_groups(document.groups, &editor.graph);
        if editor.groups.len() < stored_groups {
            editor.notify(format!(
                "dropped {} groups with fewer than 2 members",
                stored_groups - editor.groups.len()
            ));
        }

        info!(
            "Opened sequence {}/{}: {} nodes, {} edges, {} groups",
            editor.bom_id,
            editor.spec,
            editor.graph.node_count(),
            editor.graph.edge_count(),
            editor.groups.len()
        );
        editor
    }

    /// Snapshot for saving. Zones are not included.
    pub fn to_document(&self) -> SequenceDocument {
        SequenceDocument {
            bom_id: self.bom_id.clone(),
            spec: self.spec.clone(),
            nodes: self.graph.nodes().map(StoredNode::from).collect(),
            edges: self.graph.edges().cloned().collect(),
            groups: self.groups.groups().to_vec(),
        }
    }

    pub fn graph(&self) -> &SequenceGraph {
        &self.graph
    }

    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn sizes(&self) -> &MeasuredOrDefault {
        &self.sizes
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Take every pending notice
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub(crate) fn notify(&mut self, message: impl Into<String>) {
        let notice = Notice::new(message);
        debug!("Notice: {}", notice);
        self.notices.push(notice);
    }

    // ============================================================================
    // Graph operations
    // ============================================================================

    pub fn add_node(
        &mut self,
        kind: NodeKind,
        position: Position,
        data: NodeData,
    ) -> GraphResult<NodeId> {
        Ok(self.graph.add_node(kind, position, data)?.id)
    }

    /// Create a node from a palette template at `position`
    pub fn drop_template(
        &mut self,
        template: &PaletteTemplate,
        position: Position,
    ) -> GraphResult<NodeId> {
        let data = node_data_from_template(template);
        self.add_node(template.kind, position, data)
    }

    /// Remove a node, its edges, and every reference to it
    pub fn remove_node(&mut self, node_id: &NodeId) -> GraphResult<RemovedNode> {
        let removed = self.graph.remove_node(node_id)?;

        self.groups.prune_node(node_id);
        for zone_id in self.zones.prune_node(node_id) {
            self.notify(format!("zone {} removed with its boundary node", zone_id));
        }

        self.selection.nodes.retain(|id| id != node_id);
        if let Some(edge_id) = &self.selection.edge {
            if removed.edges.iter().any(|e| &e.id == edge_id) {
                self.selection.edge = None;
            }
        }
        self.forget_in_interaction(node_id);

        Ok(removed)
    }

    fn forget_in_interaction(&mut self, node_id: &NodeId) {
        match &mut self.interaction {
            InteractionState::Linking { source } if source == node_id => {
                self.interaction = InteractionState::Idle;
            }
            InteractionState::DraggingNodes { origins } => {
                origins.retain(|(id, _)| id != node_id);
            }
            InteractionState::DraftingZone(draft) => {
                if draft.start.as_ref() == Some(node_id) || draft.end.as_ref() == Some(node_id) {
                    draft.start = None;
                    draft.end = None;
                }
            }
            InteractionState::EditingGroupLabel(edit) => {
                if self.groups.group(&edit.group).is_none() {
                    self.interaction = InteractionState::Idle;
                }
            }
            _ => {}
        }
    }

    pub fn move_node(&mut self, node_id: &NodeId, position: Position) -> GraphResult<()> {
        self.graph.move_node(node_id, position)
    }

    /// Validated edge add. A rejection is also queued as a notice.
    pub fn add_edge(
        &mut self,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<SequenceEdge, ConnectionRejection> {
        let result = self.graph.add_edge(source, target);
        if let Err(reason) = &result {
            self.notify(reason.to_string());
        }
        result
    }

    pub fn remove_edge(&mut self, edge_id: &EdgeId) -> GraphResult<SequenceEdge> {
        let edge = self.graph.remove_edge(edge_id)?;
        if self.selection.edge.as_ref() == Some(edge_id) {
            self.selection.edge = None;
        }
        Ok(edge)
    }

    /// Attach a free-text note to an edge
    pub fn set_edge_note(&mut self, edge_id: &EdgeId, note: &str) -> GraphResult<()> {
        let mut patch = NodeData::new();
        patch.insert(KEY_NOTE.into(), note.into());
        self.graph.update_edge_data(edge_id, patch)
    }

    pub fn set_repeat_weight(&mut self, node_id: &NodeId, weight: i64) -> GraphResult<()> {
        self.graph.update_node_data(node_id, repeat_weight_patch(weight))
    }

    /// Store the chosen option on a node.
    ///
    /// The option must be one the resolver offers for the node; the empty
    /// string clears the choice.
    pub fn choose_option(
        &mut self,
        node_id: &NodeId,
        option: &str,
        resolver: &dyn OptionResolver,
    ) -> GraphResult<Result<(), OptionRejection>> {
        let node = self
            .graph
            .node(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;

        if !option.is_empty() {
            let Some((part_base, source_sheet)) = option_lookup_key(node) else {
                return Ok(Err(OptionRejection::NoLookupKey));
            };
            let offered = resolver.resolve_options(node.kind, part_base, source_sheet);
            if !offered.iter().any(|o| o == option) {
                return Ok(Err(OptionRejection::NotOffered(option.to_string())));
            }
        }

        let mut patch = NodeData::new();
        patch.insert(KEY_OPTION.into(), option.into());
        self.graph.update_node_data(node_id, patch)?;
        Ok(Ok(()))
    }

    // ============================================================================
    // Groups and zones
    // ============================================================================

    /// Group the current node selection
    pub fn create_group_from_selection(&mut self) -> Option<GroupId> {
        let selected = self.selection.nodes.clone();
        self.create_group_with(&selected)
    }

    /// Group the given nodes regardless of the current selection
    pub fn create_group_with(&mut self, node_ids: &[NodeId]) -> Option<GroupId> {
        self.groups.create_from_selection(&self.graph, node_ids)
    }

    pub fn rename_group(&mut self, group_id: &GroupId, label: &str) -> bool {
        self.groups.rename(group_id, label)
    }

    pub fn delete_group(&mut self, group_id: &GroupId) -> bool {
        self.groups.delete(group_id).is_some()
    }

    pub fn group_bbox(&self, group_id: &GroupId) -> Option<BoundingBox> {
        self.groups.group_bbox(&self.graph, group_id, &self.sizes)
    }

    /// Create a zone. A rejection is also queued as a notice.
    pub fn create_zone(
        &mut self,
        name: &str,
        start: &NodeId,
        end: &NodeId,
    ) -> Result<Zone, ZoneRejection> {
        let result = self.zones.create_zone(&self.graph, name, start, end);
        if let Err(reason) = &result {
            self.notify(reason.to_string());
        }
        result
    }

    /// Create a zone from a completed draft
    pub fn create_zone_from_draft(&mut self, draft: &ZoneDraft) -> Option<Result<Zone, ZoneRejection>> {
        let (start, end) = (draft.start.as_ref()?, draft.end.as_ref()?);
        Some(self.create_zone(&draft.name, start, end))
    }

    pub fn remove_zone(&mut self, zone_id: &ZoneId) -> bool {
        self.zones.remove_zone(zone_id).is_some()
    }

    pub fn zone_bbox(&self, zone_id: &ZoneId) -> Option<BoundingBox> {
        self.zones.zone_bbox(&self.graph, zone_id, &self.sizes)
    }
}
