/// Canvas Interaction Controller
///
/// Turns canvas gestures into validated operations on a [`SequenceEditor`].
/// The controller is an explicit state machine:
///
/// - `Idle`: nothing in progress
/// - `Linking`: a link source has been designated with shift-click
/// - `EditingGroupLabel`: one group's label is being edited
/// - `DraggingNodes`: nodes are being dragged
/// - `DraggingGroup`: a group is being dragged by its handle
/// - `DraftingZone`: node clicks pick a new zone's start and end
///
/// Every handler returns `None` when the gesture had no effect, or an
/// [`InteractionResult`] describing what happened.
use tracing::debug;

use crate::editor::SequenceEditor;
use crate::geometry::Position;
use crate::graph::{EdgeId, NodeId};
use crate::group::{DragStop, GroupId, LabelEdit, MembershipChange};
use crate::palette::PaletteTemplate;
use crate::validation::ConnectionRejection;
use crate::zone::{ZoneDraft, ZoneId, ZoneRejection};

// ============================================================================
// Interaction State
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,

    /// Waiting for a second shift-click to complete an edge
    Linking { source: NodeId },

    EditingGroupLabel(LabelEdit),

    /// Each dragged node with the position its drag started from
    DraggingNodes { origins: Vec<(NodeId, Position)> },

    /// `last` is the pointer position of the previous frame
    DraggingGroup { group: GroupId, last: Position },

    DraftingZone(ZoneDraft),
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// The pending link source, if any
    pub fn link_source(&self) -> Option<&NodeId> {
        match self {
            InteractionState::Linking { source } => Some(source),
            _ => None,
        }
    }

    pub fn label_edit(&self) -> Option<&LabelEdit> {
        match self {
            InteractionState::EditingGroupLabel(edit) => Some(edit),
            _ => None,
        }
    }

    pub fn zone_draft(&self) -> Option<&ZoneDraft> {
        match self {
            InteractionState::DraftingZone(draft) => Some(draft),
            _ => None,
        }
    }
}

/// Modifier keys held during a gesture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        control: false,
    };

    pub const CONTROL: Modifiers = Modifiers {
        shift: false,
        control: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Enter,
    Character(char),
}

/// Where keyboard focus was when a key was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFocus {
    Canvas,

    /// A text field, e.g. a label editor or the inspector
    TextInput,
}

/// A node position reported by the canvas during or at the end of a drag
#[derive(Debug, Clone, PartialEq)]
pub struct PositionChange {
    pub id: NodeId,
    pub position: Position,

    /// False once the drag of this node has ended
    pub dragging: bool,
}

/// Result of an interaction
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionResult {
    // Selection
    NodeSelected(NodeId),
    SelectionToggled(NodeId),
    EdgeSelected(EdgeId),
    SelectionCleared,

    // Linking
    LinkStarted(NodeId),
    LinkCancelled,
    EdgeCreated(EdgeId),
    EdgeCreationFailed(ConnectionRejection),

    // Deletion
    EdgeDeleted(EdgeId),
    NodesDeleted(Vec<NodeId>),

    // Nodes
    NodeCreated(NodeId),
    NodeDragStarted,
    NodesMoved(usize),
    NodeDragEnded(MembershipChange),

    // Groups
    GroupCreated(GroupId),
    GroupDragStarted(GroupId),
    GroupMoved(GroupId),
    GroupDragEnded(GroupId),
    LabelEditStarted(GroupId),
    LabelEditUpdated,
    LabelCommitted(GroupId),

    // Zones
    ZoneDraftStarted,
    ZoneDraftUpdated,
    ZonePointPicked(NodeId),
    ZoneCreated(ZoneId),
    ZoneCreationFailed(ZoneRejection),

    // General
    OperationCancelled,
}

/// Abandon an uncommitted label edit. Returns whether one was pending.
fn cancel_label_edit(editor: &mut SequenceEditor) -> bool {
    if let InteractionState::EditingGroupLabel(edit) = &editor.interaction {
        debug!("Cancelled label edit of group {}", edit.group);
        editor.interaction = InteractionState::Idle;
        return true;
    }
    false
}

// ============================================================================
// Click Handlers
// ============================================================================

/// Handle a click on a node
pub fn handle_node_click(
    editor: &mut SequenceEditor,
    node_id: &NodeId,
    modifiers: Modifiers,
) -> Option<InteractionResult> {
    if !editor.graph.contains_node(node_id) {
        return None;
    }
    cancel_label_edit(editor);

    if let InteractionState::DraftingZone(draft) = &mut editor.interaction {
        draft.pick(node_id.clone());
        return Some(InteractionResult::ZonePointPicked(node_id.clone()));
    }

    if modifiers.shift {
        return Some(handle_link_click(editor, node_id));
    }

    editor.interaction = InteractionState::Idle;
    if modifiers.control {
        editor.selection.toggle_node(node_id.clone());
        return Some(InteractionResult::SelectionToggled(node_id.clone()));
    }

    editor.selection.select_node(node_id.clone());
    Some(InteractionResult::NodeSelected(node_id.clone()))
}

fn handle_link_click(editor: &mut SequenceEditor, node_id: &NodeId) -> InteractionResult {
    let source = match std::mem::take(&mut editor.interaction) {
        InteractionState::Linking { source } => source,
        _ => {
            debug!("Link source set to {}", node_id);
            editor.interaction = InteractionState::Linking {
                source: node_id.clone(),
            };
            return InteractionResult::LinkStarted(node_id.clone());
        }
    };

    // Back to idle whatever the outcome
    if &source == node_id {
        return InteractionResult::LinkCancelled;
    }
    match editor.add_edge(&source, node_id) {
        Ok(edge) => InteractionResult::EdgeCreated(edge.id),
        Err(reason) => InteractionResult::EdgeCreationFailed(reason),
    }
}

/// Handle a click on an edge
pub fn handle_edge_click(
    editor: &mut SequenceEditor,
    edge_id: &EdgeId,
) -> Option<InteractionResult> {
    if !editor.graph.contains_edge(edge_id) {
        return None;
    }
    cancel_label_edit(editor);
    if editor.interaction.link_source().is_some() {
        editor.interaction = InteractionState::Idle;
    }

    editor.selection.select_edge(edge_id.clone());
    Some(InteractionResult::EdgeSelected(edge_id.clone()))
}

/// Handle a click on the empty canvas
pub fn handle_pane_click(editor: &mut SequenceEditor) -> Option<InteractionResult> {
    cancel_label_edit(editor);
    if editor.interaction.link_source().is_some() {
        editor.interaction = InteractionState::Idle;
    }

    if editor.selection.is_empty() {
        return None;
    }
    editor.selection.clear();
    Some(InteractionResult::SelectionCleared)
}

// ============================================================================
// Keyboard Handlers
// ============================================================================

/// Handle a key press
pub fn handle_key_press(
    editor: &mut SequenceEditor,
    key: Key,
    modifiers: Modifiers,
    focus: KeyFocus,
) -> Option<InteractionResult> {
    if focus == KeyFocus::TextInput {
        // Only the label editor reacts to keys typed into a text field
        return match (key, editor.interaction.label_edit().is_some()) {
            (Key::Enter, true) => handle_label_commit(editor),
            (Key::Escape, true) => handle_label_cancel(editor),
            _ => None,
        };
    }

    match key {
        Key::Delete | Key::Backspace => delete_selection(editor),

        Key::Escape => {
            if editor.interaction.link_source().is_some() {
                editor.interaction = InteractionState::Idle;
                return Some(InteractionResult::LinkCancelled);
            }
            handle_label_cancel(editor).or_else(|| handle_zone_draft_cancel(editor))
        }

        Key::Enter => handle_label_commit(editor),

        Key::Character(c) if c.eq_ignore_ascii_case(&'g') && modifiers.shift => {
            cancel_label_edit(editor);
            editor
                .create_group_from_selection()
                .map(InteractionResult::GroupCreated)
        }

        Key::Character(_) => None,
    }
}

/// Delete the selected edge, or else the selected nodes
fn delete_selection(editor: &mut SequenceEditor) -> Option<InteractionResult> {
    cancel_label_edit(editor);

    if let Some(edge_id) = editor.selection.edge.clone() {
        editor.selection.edge = None;
        return editor
            .remove_edge(&edge_id)
            .ok()
            .map(|edge| InteractionResult::EdgeDeleted(edge.id));
    }

    if editor.selection.nodes.is_empty() {
        return None;
    }

    let selected = std::mem::take(&mut editor.selection.nodes);
    let deleted: Vec<NodeId> = selected
        .into_iter()
        .filter(|id| editor.remove_node(id).is_ok())
        .collect();
    debug!("Deleted {} selected nodes", deleted.len());
    Some(InteractionResult::NodesDeleted(deleted))
}

// ============================================================================
// Drag Handlers
// ============================================================================

/// Handle the start of a node drag
pub fn handle_node_drag_start(
    editor: &mut SequenceEditor,
    ids: &[NodeId],
) -> Option<InteractionResult> {
    let origins: Vec<(NodeId, Position)> = ids
        .iter()
        .filter_map(|id| editor.graph.node(id).map(|node| (id.clone(), node.position)))
        .collect();
    if origins.is_empty() {
        return None;
    }

    editor.interaction = InteractionState::DraggingNodes { origins };
    Some(InteractionResult::NodeDragStarted)
}

/// Handle one frame of a node drag
pub fn handle_node_drag_move(
    editor: &mut SequenceEditor,
    node_id: &NodeId,
    position: Position,
) -> Option<InteractionResult> {
    handle_position_changes(
        editor,
        &[PositionChange {
            id: node_id.clone(),
            position,
            dragging: true,
        }],
    )
}

/// Apply a batch of position changes from the canvas.
///
/// All positions are applied first. Nodes whose drag ended in this batch then
/// get their group membership recomputed, in event order. A node without a
/// recorded drag start counts as starting where it stood before the batch.
pub fn handle_position_changes(
    editor: &mut SequenceEditor,
    changes: &[PositionChange],
) -> Option<InteractionResult> {
    let stopped: Vec<DragStop> = changes
        .iter()
        .filter(|change| !change.dragging)
        .filter_map(|change| {
            let origin = drag_origin(&editor.interaction, &change.id)
                .or_else(|| editor.graph.node(&change.id).map(|node| node.position))?;
            Some(DragStop::new(change.id.clone(), origin))
        })
        .collect();

    let moved = changes
        .iter()
        .filter(|change| editor.graph.move_node(&change.id, change.position).is_ok())
        .count();

    if stopped.is_empty() {
        return (moved > 0).then_some(InteractionResult::NodesMoved(moved));
    }

    if matches!(editor.interaction, InteractionState::DraggingNodes { .. }) {
        editor.interaction = InteractionState::Idle;
    }
    let sizes = *editor.sizes();
    let change = editor
        .groups
        .on_nodes_drag_stop(&editor.graph, &sizes, &stopped);
    Some(InteractionResult::NodeDragEnded(change))
}

fn drag_origin(state: &InteractionState, node_id: &NodeId) -> Option<Position> {
    match state {
        InteractionState::DraggingNodes { origins } => origins
            .iter()
            .find(|(id, _)| id == node_id)
            .map(|(_, origin)| *origin),
        _ => None,
    }
}

/// Handle a press on a group's drag handle
pub fn handle_group_handle_press(
    editor: &mut SequenceEditor,
    group_id: &GroupId,
    pointer: Position,
) -> Option<InteractionResult> {
    editor.groups.group(group_id)?;
    cancel_label_edit(editor);

    editor.interaction = InteractionState::DraggingGroup {
        group: group_id.clone(),
        last: pointer,
    };
    Some(InteractionResult::GroupDragStarted(group_id.clone()))
}

/// Move the dragged group by the pointer delta since the last frame
pub fn handle_group_handle_move(
    editor: &mut SequenceEditor,
    pointer: Position,
) -> Option<InteractionResult> {
    let InteractionState::DraggingGroup { group, last } = &mut editor.interaction else {
        return None;
    };
    let (dx, dy) = (pointer.x - last.x, pointer.y - last.y);
    *last = pointer;
    let group = group.clone();

    editor.groups.translate(&mut editor.graph, &group, dx, dy);
    Some(InteractionResult::GroupMoved(group))
}

pub fn handle_group_handle_release(editor: &mut SequenceEditor) -> Option<InteractionResult> {
    match std::mem::take(&mut editor.interaction) {
        InteractionState::DraggingGroup { group, .. } => {
            Some(InteractionResult::GroupDragEnded(group))
        }
        other => {
            editor.interaction = other;
            None
        }
    }
}

// ============================================================================
// Label Editing
// ============================================================================

/// Double-click on a group label: start editing it, dropping any other edit
pub fn handle_group_label_double_click(
    editor: &mut SequenceEditor,
    group_id: &GroupId,
) -> Option<InteractionResult> {
    let label = editor.groups.group(group_id)?.label.clone();
    editor.interaction = InteractionState::EditingGroupLabel(LabelEdit {
        group: group_id.clone(),
        draft: label,
    });
    Some(InteractionResult::LabelEditStarted(group_id.clone()))
}

/// Replace the uncommitted label text
pub fn handle_label_input(editor: &mut SequenceEditor, text: &str) -> Option<InteractionResult> {
    let InteractionState::EditingGroupLabel(edit) = &mut editor.interaction else {
        return None;
    };
    edit.draft = text.to_string();
    Some(InteractionResult::LabelEditUpdated)
}

/// Enter: write the draft to the group
pub fn handle_label_commit(editor: &mut SequenceEditor) -> Option<InteractionResult> {
    let edit = editor.interaction.label_edit()?.clone();
    editor.interaction = InteractionState::Idle;
    if editor.rename_group(&edit.group, &edit.draft) {
        Some(InteractionResult::LabelCommitted(edit.group))
    } else {
        None
    }
}

/// Focus left the label editor; commits like Enter
pub fn handle_label_blur(editor: &mut SequenceEditor) -> Option<InteractionResult> {
    handle_label_commit(editor)
}

/// Escape: drop the draft without touching the group
pub fn handle_label_cancel(editor: &mut SequenceEditor) -> Option<InteractionResult> {
    cancel_label_edit(editor).then_some(InteractionResult::OperationCancelled)
}

// ============================================================================
// Palette and Zones
// ============================================================================

/// Create a node from a template dropped on the canvas
pub fn handle_palette_drop(
    editor: &mut SequenceEditor,
    template: &PaletteTemplate,
    position: Position,
) -> Option<InteractionResult> {
    cancel_label_edit(editor);
    editor
        .drop_template(template, position)
        .ok()
        .map(InteractionResult::NodeCreated)
}

/// Start picking a zone's start and end nodes
pub fn handle_zone_draft_start(
    editor: &mut SequenceEditor,
    name: &str,
) -> Option<InteractionResult> {
    cancel_label_edit(editor);
    editor.interaction = InteractionState::DraftingZone(ZoneDraft::new(name));
    Some(InteractionResult::ZoneDraftStarted)
}

pub fn handle_zone_draft_name(editor: &mut SequenceEditor, name: &str) -> Option<InteractionResult> {
    let InteractionState::DraftingZone(draft) = &mut editor.interaction else {
        return None;
    };
    draft.name = name.to_string();
    Some(InteractionResult::ZoneDraftUpdated)
}

/// Create the drafted zone. On rejection the draft stays open for new picks.
pub fn handle_zone_draft_commit(editor: &mut SequenceEditor) -> Option<InteractionResult> {
    let draft = editor.interaction.zone_draft()?.clone();
    match editor.create_zone_from_draft(&draft)? {
        Ok(zone) => {
            editor.interaction = InteractionState::Idle;
            Some(InteractionResult::ZoneCreated(zone.id))
        }
        Err(reason) => Some(InteractionResult::ZoneCreationFailed(reason)),
    }
}

pub fn handle_zone_draft_cancel(editor: &mut SequenceEditor) -> Option<InteractionResult> {
    editor.interaction.zone_draft()?;
    editor.interaction = InteractionState::Idle;
    Some(InteractionResult::OperationCancelled)
}
