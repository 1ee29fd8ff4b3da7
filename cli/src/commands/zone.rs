use anyhow::Result;
use colored::Colorize;
use sequencer_core::{compute_zone_bbox, compute_zone_node_set, NodeId};

use super::Workspace;

/// Print the zone a (start, end) pair would cover. Zones are not saved.
pub fn execute(
    workspace: &Workspace,
    bom: &str,
    spec: &str,
    start: &str,
    end: &str,
    name: &str,
) -> Result<()> {
    let editor = workspace.open_editor(bom, spec)?;
    let graph = editor.graph();

    let zone = compute_zone_node_set(
        graph.nodes(),
        graph.edges(),
        &NodeId::from(start),
        &NodeId::from(end),
    );

    println!("{} '{}' {} -> {}", "Zone".bold(), name, start, end);
    if !zone.has_path {
        println!("  {}", "no path between start and end".red());
        return Ok(());
    }

    println!("  {} {}", "path:".cyan(), "yes".green());
    println!("  {} {}", "nodes:".cyan(), zone.node_ids.len());
    for id in &zone.node_ids {
        println!("    {}", id);
    }

    let bbox = compute_zone_bbox(
        graph.nodes(),
        &zone.node_ids,
        workspace.config().canvas.zone_padding,
        editor.sizes(),
    );
    if let Some(bbox) = bbox {
        println!(
            "  {} x={:.1} y={:.1} width={:.1} height={:.1}",
            "bbox:".cyan(),
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height
        );
    }
    Ok(())
}
