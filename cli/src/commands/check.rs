use anyhow::{bail, Result};
use colored::Colorize;
use sequencer_core::group::MIN_GROUP_SIZE;
use sequencer_core::{NodeId, SequenceDocument, SequenceGraph};
use std::collections::HashMap;
use tracing::info;

use super::Workspace;

pub fn execute(workspace: &Workspace, bom: &str, spec: &str) -> Result<()> {
    let document = workspace.load_document(bom, spec)?;
    let problems = find_problems(&document);

    if problems.is_empty() {
        println!("{} {}/{}", "OK".green().bold(), bom, spec);
        return Ok(());
    }

    for problem in &problems {
        println!("{} {}", "problem:".red().bold(), problem);
    }
    info!("Check found {} problems", problems.len());
    bail!("{} problems found in {}/{}", problems.len(), bom, spec)
}

/// Everything wrong with a stored document, as it was saved
pub fn find_problems(document: &SequenceDocument) -> Vec<String> {
    let mut problems = Vec::new();

    let (graph, dropped) = SequenceGraph::from_parts(document.live_nodes(), document.edges.clone());
    for dropped_edge in dropped {
        problems.push(format!(
            "edge {} ({} -> {}): {}",
            dropped_edge.edge.id, dropped_edge.edge.source, dropped_edge.edge.target, dropped_edge.reason
        ));
    }

    if graph.has_cycle() {
        problems.push("edges contain a cycle".to_string());
    }

    let mut owner: HashMap<&NodeId, &str> = HashMap::new();
    for group in &document.groups {
        let resolved = group
            .node_ids
            .iter()
            .filter(|id| graph.contains_node(id))
            .count();
        if resolved < MIN_GROUP_SIZE {
            problems.push(format!(
                "group '{}' has {} resolvable members",
                group.label, resolved
            ));
        }

        for id in &group.node_ids {
            if let Some(previous) = owner.insert(id, group.label.as_str()) {
                problems.push(format!(
                    "node {} is in both '{}' and '{}'",
                    id, previous, group.label
                ));
            }
        }
    }

    problems
}
