/// Palette templates and node option handling
///
/// The template catalog and the option lists live outside the core. These
/// traits are the seams the editor reads them through.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::graph::{NodeData, NodeKind, SequenceNode};

pub const KEY_LABEL: &str = "label";
pub const KEY_PART_ID: &str = "partId";
pub const KEY_PART_BASE: &str = "partBase";
pub const KEY_PROCESS_KEY: &str = "processKey";
pub const KEY_PROCESS_TYPE: &str = "processType";
pub const KEY_SOURCE_SHEET: &str = "sourceSheet";
pub const KEY_OPTION: &str = "option";
pub const KEY_REPEAT_WEIGHT: &str = "repeatWeight";
pub const KEY_NOTE: &str = "note";

/// An entry of the drag palette
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteTemplate {
    pub kind: NodeKind,

    /// Part id for PART templates, process key for PROCESS templates
    pub key: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub source_sheet: Option<String>,

    #[serde(default)]
    pub part_base: Option<String>,

    /// Extra fields copied into the node payload as-is
    #[serde(default)]
    pub data: NodeData,
}

impl PaletteTemplate {
    pub fn part(part_id: impl Into<String>) -> Self {
        PaletteTemplate {
            kind: NodeKind::Part,
            key: part_id.into(),
            label: None,
            source_sheet: None,
            part_base: None,
            data: NodeData::new(),
        }
    }

    pub fn process(process_key: impl Into<String>) -> Self {
        PaletteTemplate {
            kind: NodeKind::Process,
            key: process_key.into(),
            label: None,
            source_sheet: None,
            part_base: None,
            data: NodeData::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_source_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.source_sheet = Some(sheet.into());
        self
    }

    pub fn with_part_base(mut self, part_base: impl Into<String>) -> Self {
        self.part_base = Some(part_base.into());
        self
    }
}

/// Seed a node payload from a template, including the computed `label`
pub fn node_data_from_template(template: &PaletteTemplate) -> NodeData {
    let mut data = template.data.clone();
    let key_field = match template.kind {
        NodeKind::Part => KEY_PART_ID,
        NodeKind::Process => KEY_PROCESS_KEY,
    };
    data.insert(key_field.into(), template.key.clone().into());

    if let Some(label) = &template.label {
        data.insert(KEY_LABEL.into(), label.clone().into());
    }
    if let Some(sheet) = &template.source_sheet {
        data.insert(KEY_SOURCE_SHEET.into(), sheet.clone().into());
    }
    if let Some(part_base) = &template.part_base {
        data.insert(KEY_PART_BASE.into(), part_base.clone().into());
    }
    if template.kind == NodeKind::Process && !data.contains_key(KEY_REPEAT_WEIGHT) {
        data.insert(KEY_REPEAT_WEIGHT.into(), 1.into());
    }

    let label = label_for(template.kind, &data);
    data.insert(KEY_LABEL.into(), label.into());
    data
}

fn str_field<'a>(data: &'a NodeData, key: &str) -> Option<&'a str> {
    data.get(key).and_then(|v| v.as_str())
}

/// PART: partBase, then partId. PROCESS: label, then processType.
/// Falls back to the kind name.
fn label_for(kind: NodeKind, data: &NodeData) -> String {
    let found = match kind {
        NodeKind::Part => str_field(data, KEY_PART_BASE).or_else(|| str_field(data, KEY_PART_ID)),
        NodeKind::Process => {
            str_field(data, KEY_LABEL).or_else(|| str_field(data, KEY_PROCESS_TYPE))
        }
    };
    found.unwrap_or(kind.as_str()).to_string()
}

/// Display label of a node
pub fn node_label(node: &SequenceNode) -> String {
    label_for(node.kind, &node.data)
}

/// Payload patch setting `repeatWeight`, clamped to at least 1
pub fn repeat_weight_patch(weight: i64) -> NodeData {
    let mut patch = NodeData::new();
    patch.insert(KEY_REPEAT_WEIGHT.into(), weight.max(1).into());
    patch
}

/// The (partBase, sourceSheet) pair options are resolved by, if the node has both
pub fn option_lookup_key(node: &SequenceNode) -> Option<(&str, &str)> {
    let part_base = str_field(&node.data, KEY_PART_BASE)?;
    let source_sheet = str_field(&node.data, KEY_SOURCE_SHEET)?;
    Some((part_base, source_sheet))
}

/// Source of palette templates
pub trait PaletteCatalog {
    fn templates(&self) -> &[PaletteTemplate];

    fn find_template(&self, kind: NodeKind, key: &str) -> Option<&PaletteTemplate> {
        self.templates()
            .iter()
            .find(|t| t.kind == kind && t.key == key)
    }
}

impl PaletteCatalog for Vec<PaletteTemplate> {
    fn templates(&self) -> &[PaletteTemplate] {
        self
    }
}

/// Resolves the selectable options of a node
pub trait OptionResolver {
    fn resolve_options(&self, kind: NodeKind, part_base: &str, source_sheet: &str) -> Vec<String>;
}

/// Option lists keyed by (partBase, sourceSheet), same for both kinds
impl OptionResolver for HashMap<(String, String), Vec<String>> {
    fn resolve_options(&self, _kind: NodeKind, part_base: &str, source_sheet: &str) -> Vec<String> {
        self.get(&(part_base.to_string(), source_sheet.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;
    use serde_json::json;

    #[test]
    fn test_part_label_prefers_part_base() {
        let data = node_data_from_template(&PaletteTemplate::part("P-100").with_part_base("BODY"));
        assert_eq!(data[KEY_LABEL], json!("BODY"));
        assert_eq!(data[KEY_PART_ID], json!("P-100"));

        let data = node_data_from_template(&PaletteTemplate::part("P-100"));
        assert_eq!(data[KEY_LABEL], json!("P-100"));
    }

    #[test]
    fn test_process_label_rules() {
        let data = node_data_from_template(&PaletteTemplate::process("k1").with_label("Welding"));
        assert_eq!(data[KEY_LABEL], json!("Welding"));
        assert_eq!(data[KEY_REPEAT_WEIGHT], json!(1));

        let mut template = PaletteTemplate::process("k2");
        template.data.insert(KEY_PROCESS_TYPE.into(), json!("STANDARD"));
        assert_eq!(node_data_from_template(&template)[KEY_LABEL], json!("STANDARD"));

        assert_eq!(
            node_data_from_template(&PaletteTemplate::process("k3"))[KEY_LABEL],
            json!("PROCESS")
        );
    }

    #[test]
    fn test_repeat_weight_clamped() {
        assert_eq!(repeat_weight_patch(0)[KEY_REPEAT_WEIGHT], json!(1));
        assert_eq!(repeat_weight_patch(-4)[KEY_REPEAT_WEIGHT], json!(1));
        assert_eq!(repeat_weight_patch(3)[KEY_REPEAT_WEIGHT], json!(3));
    }

    #[test]
    fn test_option_lookup_key() {
        let template = PaletteTemplate::process("k")
            .with_part_base("BODY")
            .with_source_sheet("Sheet1");
        let node = SequenceNode::new_auto(NodeKind::Process, Position::default())
            .with_data(node_data_from_template(&template));
        assert_eq!(option_lookup_key(&node), Some(("BODY", "Sheet1")));

        let bare = SequenceNode::new_auto(NodeKind::Part, Position::default());
        assert_eq!(option_lookup_key(&bare), None);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = vec![PaletteTemplate::part("A"), PaletteTemplate::process("A")];
        assert_eq!(
            catalog.find_template(NodeKind::Process, "A").map(|t| t.kind),
            Some(NodeKind::Process)
        );
        assert!(catalog.find_template(NodeKind::Part, "B").is_none());
    }
}
