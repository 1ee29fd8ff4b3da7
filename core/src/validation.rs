/// Connection Validator
///
/// A pure decision function over the current edge set: given a proposed
/// (source, target) pair, either approve it or name the rule it breaks. The
/// validator never mutates the graph.
///
/// Rules are checked in a fixed order and the first failure wins:
///
/// 1. both endpoints must exist
/// 2. no self-connections
/// 3. no second edge for the same ordered pair
/// 4. the edge must not close a cycle
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::graph::{NodeId, SequenceGraph};

/// Why a proposed connection was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionRejection {
    /// Source or target is not in the graph
    InvalidEndpoint,
    SelfConnection,
    DuplicateConnection,
    CycleForbidden,
}

impl fmt::Display for ConnectionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ConnectionRejection::InvalidEndpoint => "invalid connection",
            ConnectionRejection::SelfConnection => "self-connection forbidden",
            ConnectionRejection::DuplicateConnection => "duplicate connection",
            ConnectionRejection::CycleForbidden => "cycle forbidden",
        };
        f.write_str(reason)
    }
}

/// Outcome of [`validate_connection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionCheck {
    Ok,
    Rejected(ConnectionRejection),
}

impl ConnectionCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, ConnectionCheck::Ok)
    }

    pub fn reason(&self) -> Option<ConnectionRejection> {
        match self {
            ConnectionCheck::Ok => None,
            ConnectionCheck::Rejected(reason) => Some(*reason),
        }
    }
}

/// Decide whether `source -> target` may be added to `graph`
pub fn validate_connection(
    graph: &SequenceGraph,
    source: &NodeId,
    target: &NodeId,
) -> ConnectionCheck {
    if !graph.contains_node(source) || !graph.contains_node(target) {
        return ConnectionCheck::Rejected(ConnectionRejection::InvalidEndpoint);
    }
    if source == target {
        return ConnectionCheck::Rejected(ConnectionRejection::SelfConnection);
    }
    if graph.edge_between(source, target).is_some() {
        return ConnectionCheck::Rejected(ConnectionRejection::DuplicateConnection);
    }
    if will_create_cycle(graph, source, target) {
        return ConnectionCheck::Rejected(ConnectionRejection::CycleForbidden);
    }
    ConnectionCheck::Ok
}

fn adjacency_of(graph: &SequenceGraph) -> HashMap<&NodeId, Vec<&NodeId>> {
    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for edge in graph.edges() {
        adjacency.entry(&edge.source).or_default().push(&edge.target);
    }
    adjacency
}

/// Would adding `source -> target` make the edge set cyclic?
///
/// Builds the adjacency map with the hypothetical edge appended and runs a
/// depth-first search from `source`.
pub fn will_create_cycle(graph: &SequenceGraph, source: &NodeId, target: &NodeId) -> bool {
    let mut adjacency = adjacency_of(graph);
    adjacency.entry(source).or_default().push(target);

    let mut explored = HashSet::new();
    search_from(&adjacency, source, &mut explored)
}

/// Whole-graph cycle check, starting a search from every unexplored node
pub fn graph_has_cycle(graph: &SequenceGraph) -> bool {
    let adjacency = adjacency_of(graph);
    let mut explored = HashSet::new();

    for node in graph.nodes() {
        if explored.contains(&node.id) {
            continue;
        }
        if search_from(&adjacency, &node.id, &mut explored) {
            return true;
        }
    }
    false
}

/// Iterative DFS from `start`.
///
/// Each frame holds a node and the index of the next neighbour to visit. A node
/// is on the active path from the moment it is pushed until its frame is popped,
/// and it joins `explored` when popped. Reaching a node on the active path means
/// a back edge, hence a cycle.
fn search_from<'a>(
    adjacency: &HashMap<&'a NodeId, Vec<&'a NodeId>>,
    start: &'a NodeId,
    explored: &mut HashSet<&'a NodeId>,
) -> bool {
    let mut on_path: HashSet<&NodeId> = HashSet::new();
    let mut stack: Vec<(&NodeId, usize)> = vec![(start, 0)];
    on_path.insert(start);

    while let Some(frame) = stack.last_mut() {
        let (node, next) = *frame;
        let neighbour = adjacency.get(node).and_then(|targets| targets.get(next));

        match neighbour {
            Some(&neighbour) => {
                frame.1 += 1;
                if on_path.contains(neighbour) {
                    return true;
                }
                if !explored.contains(neighbour) {
                    on_path.insert(neighbour);
                    stack.push((neighbour, 0));
                }
            }
            None => {
                stack.pop();
                on_path.remove(node);
                explored.insert(node);
            }
        }
    }

    false
}
