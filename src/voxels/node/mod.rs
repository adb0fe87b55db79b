//! # Node Module
//!
//! A node is a single voxel of map data. This module defines the compact sample
//! that the mesher reads from a voxel field, the built-in node types, and the
//! registry holding their static properties.

use num_derive::FromPrimitive;

pub mod node_properties;

pub use node_properties::{NodeProperties, NodeTypeRegistry, RegistryError};

/// The underlying integer type used to represent node types in memory.
pub type NodeTypeSize = u8;

/// Light level carried by voxels that are fully exposed.
pub const MAX_LIGHT: u8 = 255;

/// The node types known to the default registry.
///
/// `AIR` is the designated empty type: two adjacent air nodes never produce a face.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum NodeType {
    /// Empty space.
    AIR = 0,
    /// Grey opaque rock.
    STONE = 1,
    /// Brown opaque soil.
    DIRT = 2,
    /// Green opaque soil.
    GRASS = 3,
}

impl NodeType {
    /// Number of built-in node types.
    pub const COUNT: usize = 4;

    /// Converts a raw type id to a built-in `NodeType`, if it is one.
    pub fn from_id(id: NodeTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(id)
    }

    /// Returns the raw type id.
    pub fn id(self) -> NodeTypeSize {
        self as NodeTypeSize
    }

    /// Picks a random non-empty built-in type using the given generator.
    pub fn random_solid(rng: &mut fastrand::Rng) -> Self {
        num::FromPrimitive::from_u8(rng.u8(1..NodeType::COUNT as u8)).unwrap_or(NodeType::STONE)
    }
}

/// An immutable snapshot of one voxel, as read from a voxel field.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute and `Pod` derive let whole buffers of samples be viewed
/// as raw bytes, which keeps block snapshots cheap to copy.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VoxelSample {
    /// The type of this node, used to look up its `NodeProperties`.
    pub node_type: NodeTypeSize,
    /// Per-node metadata. Two nodes only look the same if both type and meta match.
    pub meta: u8,
    /// Raw light level in `0..=255`.
    pub light: u8,
}

impl VoxelSample {
    /// Creates a new sample.
    pub fn new(node_type: NodeType, meta: u8, light: u8) -> Self {
        VoxelSample {
            node_type: node_type.id(),
            meta,
            light,
        }
    }

    /// Creates an air sample carrying the given light level.
    pub fn air(light: u8) -> Self {
        VoxelSample::new(NodeType::AIR, 0, light)
    }

    /// Creates an unlit sample of the given type with no metadata.
    pub fn solid(node_type: NodeType) -> Self {
        VoxelSample::new(node_type, 0, 0)
    }

    /// Whether this sample is of the designated empty type.
    pub fn is_empty(&self) -> bool {
        self.node_type == NodeType::AIR.id()
    }

    /// Whether two samples look identical for merging purposes (same type and meta).
    pub fn same_appearance(&self, other: &VoxelSample) -> bool {
        self.node_type == other.node_type && self.meta == other.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_does_not_affect_appearance() {
        let a = VoxelSample::new(NodeType::DIRT, 2, 10);
        let b = VoxelSample::new(NodeType::DIRT, 2, 200);
        let c = VoxelSample::new(NodeType::DIRT, 3, 10);

        assert!(a.same_appearance(&b));
        assert!(!a.same_appearance(&c));
    }

    #[test]
    fn default_sample_is_dark_air() {
        let sample = VoxelSample::default();
        assert!(sample.is_empty());
        assert_eq!(sample.light, 0);
        assert_eq!(std::mem::size_of::<VoxelSample>(), 3);
    }

    #[test]
    fn ids_round_trip_through_node_type() {
        assert_eq!(NodeType::from_id(2), Some(NodeType::DIRT));
        assert_eq!(NodeType::from_id(200), None);

        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..32 {
            assert_ne!(NodeType::random_solid(&mut rng), NodeType::AIR);
        }
    }
}
