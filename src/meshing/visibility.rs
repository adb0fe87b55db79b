//! Face culling between two adjacent voxels.

use crate::voxels::node::{NodeTypeRegistry, VoxelSample};

/// Which face, if any, to draw between a near voxel and the far voxel next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceVisibility {
    /// No face: both voxels are empty, or both are opaque cubes.
    Hidden,
    /// The near voxel's face, pointing towards the far voxel.
    NearFacing,
    /// The far voxel's face, pointing back towards the near voxel.
    FarFacing,
}

/// Decides whether the shared face of `near` and `far` is drawn, and whose it is.
///
/// When both voxels are non-empty and at least one is not an opaque cube, the far
/// voxel's face wins.
pub fn compare_faces(
    near: &VoxelSample,
    far: &VoxelSample,
    registry: &NodeTypeRegistry,
) -> FaceVisibility {
    if near.is_empty() && far.is_empty() {
        FaceVisibility::Hidden
    } else if registry.get(near.node_type).is_opaque_cube()
        && registry.get(far.node_type).is_opaque_cube()
    {
        FaceVisibility::Hidden
    } else if !near.is_empty() && far.is_empty() {
        FaceVisibility::NearFacing
    } else {
        FaceVisibility::FarFacing
    }
}
