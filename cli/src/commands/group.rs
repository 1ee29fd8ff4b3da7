use anyhow::{bail, Result};
use colored::Colorize;
use sequencer_core::NodeId;

use super::Workspace;

pub fn execute(
    workspace: &Workspace,
    bom: &str,
    spec: &str,
    ids: &[String],
    label: Option<&str>,
) -> Result<()> {
    let mut editor = workspace.open_editor(bom, spec)?;

    let selection: Vec<NodeId> = ids.iter().map(|id| NodeId::from(id.as_str())).collect();
    for id in &selection {
        if !editor.graph().contains_node(id) {
            bail!("Unknown node: {}", id);
        }
    }

    let Some(group_id) = editor.create_group_with(&selection) else {
        bail!("A group needs at least two distinct nodes");
    };
    if let Some(label) = label {
        editor.rename_group(&group_id, label);
    }
    workspace.save_editor(&editor)?;

    if let Some(group) = editor.groups().group(&group_id) {
        println!(
            "{} '{}' with {} members",
            "Created group".green().bold(),
            group.label,
            group.node_ids.len()
        );
    }
    Ok(())
}
