//! # Voxels Module
//!
//! Voxel data and the lookup capability the mesher consumes.
//!
//! * `node` - voxel samples, node types and their static properties
//! * `direction` - the six axis-aligned face directions
//! * `voxel_field` - the read-only lookup trait and its fault type
//! * `voxel_buffer` - dense snapshots used for meshing
//! * `block` / `block_map` - block storage, generation and the sparse map

pub mod block;
pub mod block_map;
pub mod direction;
pub mod node;
pub mod voxel_buffer;
pub mod voxel_field;

pub use block::{Block, GenerationMethod};
pub use block_map::BlockMap;
pub use direction::Direction;
pub use node::{NodeType, NodeTypeRegistry, VoxelSample};
pub use voxel_buffer::VoxelBuffer;
pub use voxel_field::{VoxelField, VoxelFieldError};
