use anyhow::{bail, Result};
use colored::Colorize;
use sequencer_core::palette::node_label;

use super::Workspace;

pub fn execute(workspace: &Workspace, bom: &str, spec: &str, format: &str) -> Result<()> {
    match format {
        "json" => {
            let document = workspace.load_document(bom, spec)?;
            println!("{}", document.to_json_string()?);
            Ok(())
        }
        "table" => print_table(workspace, bom, spec),
        other => bail!("Unknown format: {} (expected table or json)", other),
    }
}

fn print_table(workspace: &Workspace, bom: &str, spec: &str) -> Result<()> {
    let editor = workspace.open_editor(bom, spec)?;
    let graph = editor.graph();

    println!("{}", format!("Sequence {}/{}", bom, spec).bold());

    println!("\n{} ({})", "Nodes".cyan().bold(), graph.node_count());
    for node in graph.nodes() {
        println!(
            "  {:<40} {:<8} {:<24} ({:.0}, {:.0})",
            node.id.as_str(),
            node.kind.as_str(),
            node_label(node),
            node.position.x,
            node.position.y
        );
    }

    println!("\n{} ({})", "Edges".cyan().bold(), graph.edge_count());
    for edge in graph.edges() {
        println!("  {} -> {}", edge.source, edge.target);
    }

    let groups = editor.groups();
    println!("\n{} ({})", "Groups".cyan().bold(), groups.len());
    for group in groups.groups() {
        let members: Vec<&str> = group.node_ids.iter().map(|id| id.as_str()).collect();
        println!("  {:<16} [{}]", group.label, members.join(", "));
    }

    Ok(())
}
