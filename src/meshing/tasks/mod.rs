//! Background tasks for the meshing system.
//!
//! # Available Tasks
//! - `BlockMeshTask`: meshes one block from a snapshot of the block map

pub mod block_mesh_task;

pub use block_mesh_task::{BlockMeshTask, MeshingStats};
