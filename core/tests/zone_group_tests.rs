/// Integration tests for zones and spatial groups
use sequencer_core::{
    compute_zone_node_set, BoundingBox, DragStop, GroupRegistry, MeasuredOrDefault, NodeId, NodeKind,
    Position, SequenceGraph, SequenceNode, Size, ZoneDraft, ZoneRegistry, ZoneRejection,
};

fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

fn place(graph: &mut SequenceGraph, name: &str, x: f64, y: f64) {
    let node = SequenceNode::new(id(name), NodeKind::Process, Position::new(x, y));
    graph.insert_node(node).unwrap();
}

/// A -> B -> C -> D, with E standing alone
fn chain_with_loner() -> SequenceGraph {
    let mut graph = SequenceGraph::new();
    for (i, name) in ["A", "B", "C", "D", "E"].iter().enumerate() {
        place(&mut graph, name, i as f64 * 220.0, 0.0);
    }
    graph.add_edge(&id("A"), &id("B")).unwrap();
    graph.add_edge(&id("B"), &id("C")).unwrap();
    graph.add_edge(&id("C"), &id("D")).unwrap();
    graph
}

// ============================================================================
// Zone Tests
// ============================================================================

#[test]
fn test_zone_covers_chain_and_skips_loner() {
    let graph = chain_with_loner();
    let zone = compute_zone_node_set(graph.nodes(), graph.edges(), &id("A"), &id("D"));

    assert!(zone.has_path);
    let members: Vec<&str> = zone.node_ids.iter().map(|n| n.as_str()).collect();
    assert_eq!(members, vec!["A", "B", "C", "D"]);
    assert!(!zone.node_ids.contains(&id("E")));
}

#[test]
fn test_zone_excludes_dead_end_branches() {
    let mut graph = chain_with_loner();
    place(&mut graph, "X", 220.0, 200.0);
    graph.add_edge(&id("B"), &id("X")).unwrap();

    let zone = compute_zone_node_set(graph.nodes(), graph.edges(), &id("A"), &id("D"));
    assert!(!zone.node_ids.contains(&id("X")));
    assert_eq!(zone.node_ids.len(), 4);
}

#[test]
fn test_zone_without_path() {
    let graph = chain_with_loner();

    let reversed = compute_zone_node_set(graph.nodes(), graph.edges(), &id("D"), &id("A"));
    assert!(!reversed.has_path);
    assert!(reversed.node_ids.is_empty());

    let absent = compute_zone_node_set(graph.nodes(), graph.edges(), &id("ghost"), &id("D"));
    assert!(!absent.has_path);
    assert!(absent.node_ids.is_empty());
}

#[test]
fn test_overlapping_zone_names_the_existing_one() {
    let graph = chain_with_loner();
    let mut zones = ZoneRegistry::default();

    let z1 = zones.create_zone(&graph, "Z1", &id("A"), &id("C")).unwrap();
    let rejected = zones.create_zone(&graph, "Z2", &id("C"), &id("D"));

    assert_eq!(rejected, Err(ZoneRejection::Overlap(z1.id.clone())));
    assert_eq!(
        rejected.unwrap_err().to_string(),
        "zone overlaps existing zone"
    );
    assert_eq!(zones.len(), 1);
}

#[test]
fn test_disjoint_zones_coexist() {
    let mut graph = chain_with_loner();
    place(&mut graph, "F", 1100.0, 200.0);
    graph.add_edge(&id("E"), &id("F")).unwrap();

    let mut zones = ZoneRegistry::default();
    zones.create_zone(&graph, "first", &id("A"), &id("D")).unwrap();
    zones.create_zone(&graph, "second", &id("E"), &id("F")).unwrap();
    assert_eq!(zones.len(), 2);
    assert_eq!(zones.zone_of(&id("F")).map(|z| z.name.as_str()), Some("second"));
}

#[test]
fn test_zone_is_frozen_after_creation() {
    let mut graph = chain_with_loner();
    let mut zones = ZoneRegistry::default();
    let zone = zones.create_zone(&graph, "Z", &id("A"), &id("D")).unwrap();

    graph.add_edge(&id("D"), &id("E")).unwrap();
    let stored = zones.zone(&zone.id).unwrap();
    assert_eq!(stored.node_ids.len(), 4);
    assert!(!stored.contains(&id("E")));
}

#[test]
fn test_zone_bbox_uses_zone_padding() {
    let graph = chain_with_loner();
    let mut zones = ZoneRegistry::new(24.0);
    let zone = zones.create_zone(&graph, "Z", &id("A"), &id("B")).unwrap();

    let bbox = zones
        .zone_bbox(&graph, &zone.id, &MeasuredOrDefault::default())
        .unwrap();
    assert_eq!(bbox, BoundingBox::new(-24.0, -24.0, 448.0, 118.0));
}

#[test]
fn test_zone_and_group_share_fallback_size() {
    let graph = chain_with_loner();
    let mut zones = ZoneRegistry::new(16.0);
    let zone = zones.create_zone(&graph, "Z", &id("A"), &id("B")).unwrap();
    let mut groups = GroupRegistry::default();
    let group = groups
        .create_from_selection(&graph, &[id("A"), id("B")])
        .unwrap();

    let zone_box = zones.zone_bbox(&graph, &zone.id, &sizes()).unwrap();
    let group_box = groups.group_bbox(&graph, &group, &sizes()).unwrap();
    assert_eq!(zone_box, group_box);
    assert_eq!(zone_box.height, 70.0 + 32.0);
}

#[test]
fn test_zone_draft_flow() {
    let mut draft = ZoneDraft::new("Line 1");
    assert!(!draft.can_create());

    draft.pick(id("A"));
    draft.pick(id("C"));
    draft.pick(id("D"));
    assert_eq!(draft.start, Some(id("A")));
    assert_eq!(draft.end, Some(id("D")));
    assert!(draft.can_create());

    draft.name = "  ".to_string();
    assert!(!draft.can_create());
}

// ============================================================================
// Group Tests
// ============================================================================

fn sizes() -> MeasuredOrDefault {
    MeasuredOrDefault::default()
}

/// Move a node the way a drag does and report where it started
fn drag(graph: &mut SequenceGraph, name: &str, x: f64, y: f64) -> DragStop {
    let origin = graph.node(&id(name)).unwrap().position;
    graph.move_node(&id(name), Position::new(x, y)).unwrap();
    DragStop::new(id(name), origin)
}

#[test]
fn test_group_threshold_and_label() {
    let mut graph = SequenceGraph::new();
    place(&mut graph, "A", 0.0, 0.0);
    place(&mut graph, "B", 200.0, 0.0);
    place(&mut graph, "C", 400.0, 0.0);
    let mut groups = GroupRegistry::default();

    assert!(groups.create_from_selection(&graph, &[id("A")]).is_none());
    assert!(groups
        .create_from_selection(&graph, &[id("A"), id("ghost")])
        .is_none());
    assert!(groups.is_empty());

    let first = groups
        .create_from_selection(&graph, &[id("A"), id("B")])
        .unwrap();
    assert_eq!(groups.group(&first).unwrap().label, "그룹 1");
    assert!(first.as_str().starts_with("grp-"));
}

#[test]
fn test_regrouping_moves_members() {
    let mut graph = SequenceGraph::new();
    for (i, name) in ["A", "B", "C", "D"].iter().enumerate() {
        place(&mut graph, name, i as f64 * 200.0, 0.0);
    }
    let mut groups = GroupRegistry::default();
    let first = groups
        .create_from_selection(&graph, &[id("A"), id("B")])
        .unwrap();
    let second = groups
        .create_from_selection(&graph, &[id("B"), id("C"), id("D")])
        .unwrap();

    // "A" alone is not a group
    assert!(groups.group(&first).is_none());
    assert_eq!(groups.group_of(&id("B")).map(|g| g.id.clone()), Some(second));
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_bbox_padding() {
    let mut graph = SequenceGraph::new();
    place(&mut graph, "A", 0.0, 0.0);
    place(&mut graph, "B", 0.0, 0.0);
    graph.set_node_size(&id("A"), Size::new(100.0, 60.0)).unwrap();
    graph.set_node_size(&id("B"), Size::new(100.0, 60.0)).unwrap();

    let mut groups = GroupRegistry::default();
    let group = groups
        .create_from_selection(&graph, &[id("A"), id("B")])
        .unwrap();

    let bbox = groups.group_bbox(&graph, &group, &sizes()).unwrap();
    assert_eq!(bbox, BoundingBox::new(-16.0, -16.0, 132.0, 92.0));
}

#[test]
fn test_drag_out_dissolves_group() {
    let mut graph = SequenceGraph::new();
    place(&mut graph, "A", 0.0, 0.0);
    place(&mut graph, "B", 200.0, 0.0);
    let mut groups = GroupRegistry::default();
    let group = groups
        .create_from_selection(&graph, &[id("A"), id("B")])
        .unwrap();

    let stop = drag(&mut graph, "A", 2000.0, 2000.0);
    let change = groups.on_nodes_drag_stop(&graph, &sizes(), &[stop]);

    assert_eq!(change.left, vec![(id("A"), group.clone())]);
    assert_eq!(change.dissolved, vec![group]);
    assert!(groups.is_empty());
    assert!(groups.group_of(&id("B")).is_none());
}

#[test]
fn test_zero_distance_drag_keeps_pair() {
    let mut graph = SequenceGraph::new();
    place(&mut graph, "A", 0.0, 0.0);
    place(&mut graph, "B", 120.0, 0.0);
    graph.set_node_size(&id("A"), Size::new(100.0, 60.0)).unwrap();
    graph.set_node_size(&id("B"), Size::new(100.0, 60.0)).unwrap();
    let mut groups = GroupRegistry::default();
    let group = groups
        .create_from_selection(&graph, &[id("A"), id("B")])
        .unwrap();

    let stop = drag(&mut graph, "A", 0.0, 0.0);
    let change = groups.on_nodes_drag_stop(&graph, &sizes(), &[stop]);

    assert!(change.is_empty());
    assert_eq!(groups.group(&group).unwrap().node_ids, vec![id("A"), id("B")]);
}

#[test]
fn test_one_pixel_nudge_keeps_end_member() {
    let mut graph = SequenceGraph::new();
    for (i, name) in ["A", "B", "C"].iter().enumerate() {
        place(&mut graph, name, i as f64 * 120.0, 0.0);
        graph.set_node_size(&id(name), Size::new(100.0, 60.0)).unwrap();
    }
    let mut groups = GroupRegistry::default();
    let group = groups
        .create_from_selection(&graph, &[id("A"), id("B"), id("C")])
        .unwrap();

    let stop = drag(&mut graph, "C", 241.0, 0.0);
    let change = groups.on_nodes_drag_stop(&graph, &sizes(), &[stop]);

    assert!(change.is_empty());
    assert_eq!(groups.group(&group).unwrap().node_ids.len(), 3);
}

#[test]
fn test_drag_into_group_joins_it() {
    let mut graph = SequenceGraph::new();
    place(&mut graph, "A", 0.0, 0.0);
    place(&mut graph, "B", 200.0, 0.0);
    place(&mut graph, "C", 1000.0, 1000.0);
    let mut groups = GroupRegistry::default();
    let group = groups
        .create_from_selection(&graph, &[id("A"), id("B")])
        .unwrap();

    let stop = drag(&mut graph, "C", 100.0, 0.0);
    let change = groups.on_nodes_drag_stop(&graph, &sizes(), &[stop]);

    assert_eq!(change.joined, vec![(id("C"), group.clone())]);
    let members: Vec<&str> = groups
        .group(&group)
        .unwrap()
        .node_ids
        .iter()
        .map(|n| n.as_str())
        .collect();
    assert_eq!(members, vec!["A", "B", "C"]);
}

#[test]
fn test_overlapping_boxes_pick_the_smallest() {
    let mut graph = SequenceGraph::new();
    // Wide group spanning x 0..1180
    place(&mut graph, "W1", 0.0, 0.0);
    place(&mut graph, "W2", 1000.0, 0.0);
    // Tight group around x 400..780
    place(&mut graph, "T1", 400.0, 0.0);
    place(&mut graph, "T2", 600.0, 0.0);
    place(&mut graph, "M", 3000.0, 3000.0);

    let mut groups = GroupRegistry::default();
    let wide = groups
        .create_from_selection(&graph, &[id("W1"), id("W2")])
        .unwrap();
    let tight = groups
        .create_from_selection(&graph, &[id("T1"), id("T2")])
        .unwrap();

    let stop = drag(&mut graph, "M", 500.0, 0.0);
    groups.on_nodes_drag_stop(&graph, &sizes(), &[stop]);

    assert_eq!(groups.group_of(&id("M")).map(|g| g.id.clone()), Some(tight));
    assert!(!groups.group(&wide).unwrap().contains(&id("M")));
}

#[test]
fn test_equal_boxes_go_to_the_earlier_group() {
    let mut graph = SequenceGraph::new();
    place(&mut graph, "A1", 0.0, 0.0);
    place(&mut graph, "A2", 200.0, 0.0);
    place(&mut graph, "B1", 0.0, 0.0);
    place(&mut graph, "B2", 200.0, 0.0);
    place(&mut graph, "M", 3000.0, 3000.0);

    let mut groups = GroupRegistry::default();
    let earlier = groups
        .create_from_selection(&graph, &[id("A1"), id("A2")])
        .unwrap();
    groups
        .create_from_selection(&graph, &[id("B1"), id("B2")])
        .unwrap();

    let stop = drag(&mut graph, "M", 100.0, 0.0);
    groups.on_nodes_drag_stop(&graph, &sizes(), &[stop]);
    assert_eq!(groups.group_of(&id("M")).map(|g| g.id.clone()), Some(earlier));
}

#[test]
fn test_batch_dissolves_after_all_moves() {
    let mut graph = SequenceGraph::new();
    place(&mut graph, "A", 0.0, 0.0);
    place(&mut graph, "B", 200.0, 0.0);
    place(&mut graph, "C", 1000.0, 0.0);
    place(&mut graph, "D", 1200.0, 0.0);
    let mut groups = GroupRegistry::default();
    groups
        .create_from_selection(&graph, &[id("A"), id("B")])
        .unwrap();
    let right = groups
        .create_from_selection(&graph, &[id("C"), id("D")])
        .unwrap();

    // A leaves first; B follows it into the right-hand group in the same batch
    let stops = [
        drag(&mut graph, "A", 1000.0, 0.0),
        drag(&mut graph, "B", 1200.0, 0.0),
    ];
    let change = groups.on_nodes_drag_stop(&graph, &sizes(), &stops);

    assert_eq!(change.dissolved.len(), 1);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups.group(&right).unwrap().node_ids.len(), 4);
}

#[test]
fn test_group_translate_keeps_membership() {
    let mut graph = SequenceGraph::new();
    place(&mut graph, "A", 0.0, 0.0);
    place(&mut graph, "B", 200.0, 0.0);
    place(&mut graph, "C", 600.0, 0.0);
    let mut groups = GroupRegistry::default();
    let group = groups
        .create_from_selection(&graph, &[id("A"), id("B")])
        .unwrap();

    // Slide the group right over C; C does not join
    let moved = groups.translate(&mut graph, &group, 500.0, 0.0);
    assert_eq!(moved, 2);
    assert_eq!(graph.node(&id("A")).unwrap().position, Position::new(500.0, 0.0));
    assert!(groups.group_of(&id("C")).is_none());
    assert_eq!(groups.group(&group).unwrap().node_ids.len(), 2);
}

#[test]
fn test_delete_group_keeps_nodes() {
    let mut graph = SequenceGraph::new();
    place(&mut graph, "A", 0.0, 0.0);
    place(&mut graph, "B", 200.0, 0.0);
    let mut groups = GroupRegistry::default();
    let group = groups
        .create_from_selection(&graph, &[id("A"), id("B")])
        .unwrap();

    assert!(groups.delete(&group).is_some());
    assert!(groups.group_of(&id("A")).is_none());
    assert_eq!(graph.node_count(), 2);
}
