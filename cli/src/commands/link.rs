use anyhow::{bail, Result};
use colored::Colorize;
use sequencer_core::NodeId;

use super::Workspace;

pub fn execute(workspace: &Workspace, bom: &str, spec: &str, source: &str, target: &str) -> Result<()> {
    let mut editor = workspace.open_editor(bom, spec)?;

    let edge = match editor.add_edge(&NodeId::from(source), &NodeId::from(target)) {
        Ok(edge) => edge,
        Err(reason) => bail!("Cannot link {} -> {}: {}", source, target, reason),
    };
    workspace.save_editor(&editor)?;

    println!("{} {}", "Linked".green().bold(), edge.id);
    Ok(())
}
