//! # Node Properties Module
//!
//! Static, per-type properties of nodes and the registry that maps a type id to them.
//! The registry is an explicit immutable value handed to the mesher, so meshing never
//! depends on process-wide initialisation order.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::{NodeType, NodeTypeSize};

/// Errors raised while loading a node registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry file could not be read.
    #[error("failed to read node registry {path}: {source}")]
    Io {
        /// Path of the registry file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The registry file is not valid JSON or does not match the expected layout.
    #[error("failed to parse node registry: {0}")]
    Parse(#[from] serde_json::Error),

    /// The same type id was declared twice.
    #[error("node type {id} is declared more than once")]
    DuplicateId {
        /// The repeated id.
        id: NodeTypeSize,
    },
}

/// Static properties of a node type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProperties {
    /// Human-readable name, e.g. `"stone"`.
    pub name: String,
    /// Whether light and sight pass through the node.
    pub opaque: bool,
    /// Whether the node fills its whole cell.
    pub cube: bool,
    /// Base RGBA color.
    pub color: [u8; 4],
}

impl NodeProperties {
    /// Creates a new set of properties.
    pub fn new(name: &str, opaque: bool, cube: bool, color: [u8; 4]) -> Self {
        NodeProperties {
            name: name.to_string(),
            opaque,
            cube,
            color,
        }
    }

    /// A node that fully occludes any face it touches.
    pub fn is_opaque_cube(&self) -> bool {
        self.opaque && self.cube
    }
}

/// Properties returned for type ids nobody registered.
fn unknown_properties() -> NodeProperties {
    NodeProperties::new("unknown", false, false, [255, 0, 255, 255])
}

#[derive(Deserialize, Serialize)]
struct RegistryEntry {
    id: NodeTypeSize,
    #[serde(flatten)]
    properties: NodeProperties,
}

#[derive(Deserialize, Serialize)]
struct RegistryFile {
    nodes: Vec<RegistryEntry>,
}

/// Maps a node type id to its `NodeProperties`.
///
/// # Examples
///
/// ```
/// use voxel_mesher::voxels::node::{NodeType, NodeTypeRegistry};
///
/// let registry = NodeTypeRegistry::default();
/// assert!(registry.get(NodeType::STONE.id()).is_opaque_cube());
/// assert!(!registry.get(NodeType::AIR.id()).is_opaque_cube());
/// ```
#[derive(Clone, Debug)]
pub struct NodeTypeRegistry {
    properties: Vec<Option<NodeProperties>>,
    unknown: NodeProperties,
}

impl Default for NodeTypeRegistry {
    fn default() -> Self {
        let mut registry = NodeTypeRegistry::empty();
        registry.register(
            NodeType::AIR.id(),
            NodeProperties::new("air", false, true, [0, 0, 0, 0]),
        );
        registry.register(
            NodeType::STONE.id(),
            NodeProperties::new("stone", true, true, [127, 127, 127, 255]),
        );
        registry.register(
            NodeType::DIRT.id(),
            NodeProperties::new("dirt", true, true, [128, 64, 0, 255]),
        );
        registry.register(
            NodeType::GRASS.id(),
            NodeProperties::new("grass", true, true, [128, 192, 0, 255]),
        );
        registry
    }
}

impl NodeTypeRegistry {
    /// Creates a registry with no types at all.
    pub fn empty() -> Self {
        NodeTypeRegistry {
            properties: vec![None; NodeTypeSize::MAX as usize + 1],
            unknown: unknown_properties(),
        }
    }

    /// Registers (or replaces) the properties of a type id.
    pub fn register(&mut self, id: NodeTypeSize, properties: NodeProperties) {
        self.properties[id as usize] = Some(properties);
    }

    /// Looks up the properties of a type id, falling back to a non-opaque
    /// "unknown" entry for ids that were never registered.
    pub fn get(&self, id: NodeTypeSize) -> &NodeProperties {
        self.properties[id as usize].as_ref().unwrap_or(&self.unknown)
    }

    /// Whether the given type id has been registered.
    pub fn contains(&self, id: NodeTypeSize) -> bool {
        self.properties[id as usize].is_some()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.properties.iter().filter(|p| p.is_some()).count()
    }

    /// Whether no type is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parses a registry from its JSON form.
    ///
    /// The expected layout is
    /// `{"nodes": [{"id": 1, "name": "stone", "opaque": true, "cube": true, "color": [127, 127, 127, 255]}]}`.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = serde_json::from_str(json)?;
        let mut registry = NodeTypeRegistry::empty();
        for entry in file.nodes {
            if registry.contains(entry.id) {
                return Err(RegistryError::DuplicateId { id: entry.id });
            }
            registry.register(entry.id, entry.properties);
        }
        Ok(registry)
    }

    /// Reads and parses a registry JSON file.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let json = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serializes the registered types back to JSON.
    pub fn to_json(&self) -> Result<String, RegistryError> {
        let nodes = self
            .properties
            .iter()
            .enumerate()
            .filter_map(|(id, properties)| {
                properties.as_ref().map(|properties| RegistryEntry {
                    id: id as NodeTypeSize,
                    properties: properties.clone(),
                })
            })
            .collect();
        Ok(serde_json::to_string_pretty(&RegistryFile { nodes })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_matches_built_in_types() {
        let registry = NodeTypeRegistry::default();

        assert_eq!(registry.len(), NodeType::COUNT);
        assert_eq!(registry.get(NodeType::AIR.id()).name, "air");
        assert_eq!(registry.get(NodeType::DIRT.id()).color, [128, 64, 0, 255]);
        assert!(registry.get(NodeType::GRASS.id()).is_opaque_cube());
    }

    #[test]
    fn unknown_ids_are_not_opaque() {
        let registry = NodeTypeRegistry::default();
        let unknown = registry.get(99);

        assert_eq!(unknown.name, "unknown");
        assert!(!unknown.is_opaque_cube());
    }

    #[test]
    fn opaque_but_not_cube_does_not_occlude() {
        let slab = NodeProperties::new("slab", true, false, [1, 2, 3, 255]);
        assert!(!slab.is_opaque_cube());
    }

    #[test]
    fn parses_json_registry() {
        let json = r#"{
            "nodes": [
                {"id": 0, "name": "air", "opaque": false, "cube": true, "color": [0, 0, 0, 0]},
                {"id": 7, "name": "glass", "opaque": false, "cube": true, "color": [200, 200, 255, 128]}
            ]
        }"#;

        let registry = NodeTypeRegistry::from_json(json).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(7).name, "glass");
        assert!(!registry.get(7).is_opaque_cube());
        assert!(!registry.contains(1));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"{"nodes": [
            {"id": 1, "name": "a", "opaque": true, "cube": true, "color": [0, 0, 0, 255]},
            {"id": 1, "name": "b", "opaque": true, "cube": true, "color": [0, 0, 0, 255]}
        ]}"#;

        assert!(matches!(
            NodeTypeRegistry::from_json(json),
            Err(RegistryError::DuplicateId { id: 1 })
        ));
    }

    #[test]
    fn json_output_can_be_read_back() {
        let registry = NodeTypeRegistry::default();
        let json = registry.to_json().unwrap();
        let reloaded = NodeTypeRegistry::from_json(&json).unwrap();

        for node_type in [NodeType::AIR, NodeType::STONE, NodeType::DIRT, NodeType::GRASS] {
            assert_eq!(reloaded.get(node_type.id()), registry.get(node_type.id()));
        }
    }
}
