//! # Meshing Module
//!
//! Turns voxel data into renderable quads.
//!
//! * `face` - the per-direction geometry table and the `FastFace` quad
//! * `visibility` - which side of a voxel pair, if any, gets a face
//! * `shading` - directional light attenuation
//! * `fast_faces` - run-length merging of faces along one row
//! * `mesh` - the `BlockMeshMaker` sweeping a whole block, and the flattened `Mesh`
//! * `block_mesh_map` - LRU storage for finished meshes
//! * `tasks` - background meshing tasks

pub mod block_mesh_map;
pub mod face;
pub mod fast_faces;
pub mod mesh;
pub mod shading;
pub mod tasks;
pub mod visibility;

pub use block_mesh_map::BlockMeshMap;
pub use face::FastFace;
pub use mesh::{BlockMeshMaker, Mesh, PrimitiveType};
pub use visibility::FaceVisibility;
