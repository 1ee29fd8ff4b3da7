use anyhow::Result;
use colored::Colorize;
use sequencer_core::EdgeId;

use super::Workspace;

pub fn execute(workspace: &Workspace, bom: &str, spec: &str, edge: &str) -> Result<()> {
    let mut editor = workspace.open_editor(bom, spec)?;
    let removed = editor.remove_edge(&EdgeId::from(edge))?;
    workspace.save_editor(&editor)?;

    println!(
        "{} {} ({} -> {})",
        "Removed".green().bold(),
        removed.id,
        removed.source,
        removed.target
    );
    Ok(())
}
