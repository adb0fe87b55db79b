//! # Voxel Field Module
//!
//! The read-only lookup capability the mesher consumes. Anything that can answer
//! "what is at this world position" can be meshed: a dense `VoxelBuffer` snapshot,
//! the whole `BlockMap`, or a test fixture.

use cgmath::Point3;

use super::node::VoxelSample;

/// A fault raised while sampling a voxel field.
///
/// Any fault aborts the mesh build of the current block; the caller decides
/// whether and when to retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoxelFieldError {
    /// The position lies outside the region the field covers.
    #[error("voxel {position:?} is outside the field")]
    OutOfBounds {
        /// World position that was requested.
        position: Point3<i32>,
    },

    /// The position is covered but its data is not loaded yet.
    #[error("voxel {position:?} is not available")]
    Unavailable {
        /// World position that was requested.
        position: Point3<i32>,
    },
}

impl VoxelFieldError {
    /// The world position whose lookup failed.
    pub fn position(&self) -> Point3<i32> {
        match self {
            VoxelFieldError::OutOfBounds { position } => *position,
            VoxelFieldError::Unavailable { position } => *position,
        }
    }
}

/// Read-only access to voxels by world position.
///
/// Implementations shared between meshing workers must tolerate concurrent calls
/// and must never expose a partially applied edit.
pub trait VoxelField {
    /// Returns the voxel at `position`.
    fn get(&self, position: Point3<i32>) -> Result<VoxelSample, VoxelFieldError>;
}

impl<F: VoxelField + ?Sized> VoxelField for &F {
    fn get(&self, position: Point3<i32>) -> Result<VoxelSample, VoxelFieldError> {
        (**self).get(position)
    }
}
