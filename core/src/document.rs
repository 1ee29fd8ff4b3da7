/// Sequence documents and their persistence
///
/// A document is the saved form of one sequence: its nodes, edges and groups,
/// keyed by BOM id and spec. Zones are derived on demand and never saved.
///
/// # JSON Format
///
/// ```json
/// {
///   "bomId": "BOM-1",
///   "spec": "STD",
///   "nodes": [
///     { "id": "N-1", "type": "PART", "position": { "x": 100.0, "y": 100.0 }, "data": {} }
///   ],
///   "edges": [
///     { "id": "E-N-1-N-2", "source": "N-1", "target": "N-2", "type": "smoothstep", "data": {} }
///   ],
///   "groups": [
///     { "id": "grp-1", "label": "그룹 1", "nodeIds": ["N-1", "N-2"] }
///   ]
/// }
/// ```
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{StoreError, StoreResult};
use crate::geometry::{Position, Size};
use crate::graph::{NodeData, NodeId, NodeKind, SequenceEdge, SequenceNode};
use crate::group::Group;

/// A node as stored. Position may be missing in hand-made documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    pub id: NodeId,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    #[serde(default)]
    pub position: Option<Position>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured: Option<Size>,

    #[serde(default)]
    pub data: NodeData,

    #[serde(default = "chrono::Utc::now", rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,

    #[serde(default = "chrono::Utc::now", rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl StoredNode {
    /// A freshly stamped node with only an id, a kind and an optional position
    pub fn new(id: NodeId, kind: NodeKind, position: Option<Position>) -> Self {
        let now = chrono::Utc::now();
        StoredNode {
            id,
            kind,
            position,
            measured: None,
            data: NodeData::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<&SequenceNode> for StoredNode {
    fn from(node: &SequenceNode) -> Self {
        StoredNode {
            id: node.id.clone(),
            kind: node.kind,
            position: Some(node.position),
            measured: node.size,
            data: node.data.clone(),
            created_at: node.created_at,
            updated_at: node.updated_at,
        }
    }
}

/// Position given to the `index`-th node when the stored one is missing
pub fn grid_position(index: usize) -> Position {
    Position::new(
        100.0 + (index % 5) as f64 * 220.0,
        100.0 + (index / 5) as f64 * 120.0,
    )
}

impl StoredNode {
    /// Convert to a live node, placing it on the fallback grid if needed
    pub fn into_node(self, index: usize) -> SequenceNode {
        let position = match self.position {
            Some(position) if position.is_finite() => position,
            _ => grid_position(index),
        };
        let mut node = SequenceNode::new(self.id, self.kind, position).with_data(self.data);
        node.size = self.measured;
        node.created_at = self.created_at;
        node.updated_at = self.updated_at;
        node
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceDocument {
    pub bom_id: String,
    pub spec: String,

    #[serde(default)]
    pub nodes: Vec<StoredNode>,

    #[serde(default)]
    pub edges: Vec<SequenceEdge>,

    #[serde(default)]
    pub groups: Vec<Group>,
}

impl SequenceDocument {
    pub fn new(bom_id: impl Into<String>, spec: impl Into<String>) -> Self {
        SequenceDocument {
            bom_id: bom_id.into(),
            spec: spec.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Live nodes, in document order, with grid fallback positions applied
    pub fn live_nodes(&self) -> Vec<SequenceNode> {
        self.nodes
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, stored)| stored.into_node(index))
            .collect()
    }

    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Load/save of sequence documents, keyed by (bom id, spec)
pub trait SequenceRepository {
    /// `Ok(None)` when no document has been saved for the key
    fn load(&self, bom_id: &str, spec: &str) -> StoreResult<Option<SequenceDocument>>;

    fn save(&self, document: &SequenceDocument) -> StoreResult<()>;
}

/// Stores each document as `<base>/<bomId>/<spec>.sequence.json`
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    base_path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        JsonFileRepository {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File path for a key. Keys must be plain, non-empty file names.
    pub fn document_path(&self, bom_id: &str, spec: &str) -> StoreResult<PathBuf> {
        validate_key(bom_id)?;
        validate_key(spec)?;
        Ok(self
            .base_path
            .join(bom_id)
            .join(format!("{}.sequence.json", spec)))
    }
}

fn validate_key(key: &str) -> StoreResult<()> {
    let trimmed = key.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || key.contains(['/', '\\', '\0'])
    {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl SequenceRepository for JsonFileRepository {
    fn load(&self, bom_id: &str, spec: &str) -> StoreResult<Option<SequenceDocument>> {
        let path = self.document_path(bom_id, spec)?;
        if !path.exists() {
            debug!("No document at {}", path.display());
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        let document = SequenceDocument::from_json_str(&contents)?;
        debug!(
            "Loaded {} nodes and {} edges from {}",
            document.nodes.len(),
            document.edges.len(),
            path.display()
        );
        Ok(Some(document))
    }

    fn save(&self, document: &SequenceDocument) -> StoreResult<()> {
        let path = self.document_path(&document.bom_id, &document.spec)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, document.to_json_string()?)?;
        info!("Saved sequence document to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_grid_fallback() {
        assert_eq!(grid_position(0), Position::new(100.0, 100.0));
        assert_eq!(grid_position(4), Position::new(980.0, 100.0));
        assert_eq!(grid_position(5), Position::new(100.0, 220.0));
        assert_eq!(grid_position(12), Position::new(540.0, 340.0));
    }

    #[test]
    fn test_missing_position_placed_on_grid() {
        let json = r#"{
            "bomId": "B", "spec": "S",
            "nodes": [
                { "id": "N-1", "type": "PART", "position": { "x": 5.0, "y": 6.0 } },
                { "id": "N-2", "type": "PROCESS" }
            ]
        }"#;
        let doc = SequenceDocument::from_json_str(json).unwrap();
        let nodes = doc.live_nodes();
        assert_eq!(nodes[0].position, Position::new(5.0, 6.0));
        assert_eq!(nodes[1].position, grid_position(1));
        assert!(doc.edges.is_empty());
        assert!(doc.groups.is_empty());
    }

    #[test]
    fn test_keys_are_validated() {
        let repo = JsonFileRepository::new("/tmp/unused");
        assert!(matches!(
            repo.document_path("../etc", "S"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(repo.document_path("B", ""), Err(StoreError::InvalidKey(_))));
        assert!(matches!(repo.document_path("..", "S"), Err(StoreError::InvalidKey(_))));
        assert!(repo.document_path("BOM-1", "STD").is_ok());
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let repo = JsonFileRepository::new(dir.path());
        assert!(repo.load("B", "S").unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let repo = JsonFileRepository::new(dir.path());

        let mut doc = SequenceDocument::new("BOM-1", "STD");
        doc.nodes.push(StoredNode::new(
            NodeId::new("N-1"),
            NodeKind::Part,
            Some(Position::new(1.0, 2.0)),
        ));
        repo.save(&doc).unwrap();

        assert!(dir.path().join("BOM-1").join("STD.sequence.json").exists());
        assert_eq!(repo.load("BOM-1", "STD").unwrap(), Some(doc));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let repo = JsonFileRepository::new(dir.path());
        let path = repo.document_path("B", "S").unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(repo.load("B", "S"), Err(StoreError::JsonError(_))));
    }
}
