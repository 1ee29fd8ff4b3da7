// Sequencer: process-sequence graph editing core
// Graph store, connection validation, zones, spatial groups and canvas interaction

#[macro_use]
mod ids;

pub mod config;
pub mod document;
pub mod editor;
pub mod errors;
pub mod geometry;
pub mod graph;
pub mod group;
pub mod interaction;
pub mod palette;
pub mod reachability;
pub mod validation;
pub mod zone;

// Re-export commonly used types
pub use errors::{ConfigError, ConfigResult, GraphError, GraphResult, StoreError, StoreResult};

pub use graph::{
    DroppedEdge, EdgeId, NodeData, NodeId, NodeKind, RemovedNode, SequenceEdge, SequenceGraph,
    SequenceNode,
};

pub use geometry::{BoundingBox, MeasuredOrDefault, NodeSizeProvider, Position, Size};

pub use validation::{validate_connection, ConnectionCheck, ConnectionRejection};

pub use reachability::{bfs_reachable, reverse_bfs_reachable, Adjacency, AdjacencyMap};

pub use zone::{
    compute_zone_bbox, compute_zone_node_set, detect_zone_overlap, Zone, ZoneDraft, ZoneId,
    ZoneNodeSet, ZoneRegistry, ZoneRejection,
};

pub use group::{DragStop, Group, GroupId, GroupRegistry, LabelEdit, MembershipChange};

pub use interaction::{InteractionResult, InteractionState, Key, KeyFocus, Modifiers, PositionChange};

pub use editor::{Notice, OptionRejection, Selection, SequenceEditor};

pub use palette::{OptionResolver, PaletteCatalog, PaletteTemplate};

pub use document::{JsonFileRepository, SequenceDocument, SequenceRepository, StoredNode};

pub use config::{CanvasConfig, ConfigManager, LoggingConfig, SequencerConfig, StorageConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
