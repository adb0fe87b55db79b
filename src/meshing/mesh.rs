//! Block meshing: sweeps a block row by row and flattens the merged faces into
//! renderable buffers.

use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::{debug, trace};
use web_time::Instant;

use crate::voxels::{
    node::NodeTypeRegistry,
    voxel_field::{VoxelField, VoxelFieldError},
};

use super::{
    face::FastFace,
    fast_faces::{update_fast_faces_row, Row},
};

/// How the consumer should interpret the vertex stream of a `Mesh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    /// Independent quads, one per four consecutive vertices.
    Quads,
}

/// Renderable geometry of one block.
///
/// `positions` holds XYZ triplets and `colors` RGB triplets, one of each per vertex,
/// four vertices per face. Both always hold a multiple of 12 values.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions, three `f32` per vertex.
    pub positions: Vec<f32>,
    /// Vertex colors, three `u8` per vertex. Alpha is dropped.
    pub colors: Vec<u8>,
}

impl Mesh {
    /// Primitive layout of every mesh produced by the mesher.
    pub const PRIMITIVE_TYPE: PrimitiveType = PrimitiveType::Quads;
    /// Values per vertex in both buffers.
    pub const COMPONENTS: usize = 3;
    /// Vertices per face.
    pub const VERTICES_PER_FACE: usize = 4;

    /// Flattens fast faces into a mesh, or returns `None` when there are no faces.
    pub fn from_fast_faces(faces: &[FastFace]) -> Option<Self> {
        if faces.is_empty() {
            return None;
        }

        let len = faces.len() * Self::VERTICES_PER_FACE * Self::COMPONENTS;
        let mut positions = Vec::with_capacity(len);
        let mut colors = Vec::with_capacity(len);

        for face in faces {
            for corner in &face.corners {
                positions.extend_from_slice(&[corner.x, corner.y, corner.z]);
            }
            for color in &face.colors {
                colors.extend_from_slice(&color[..3]);
            }
        }

        Some(Mesh { positions, colors })
    }

    /// Number of quads.
    pub fn face_count(&self) -> usize {
        self.positions.len() / (Self::VERTICES_PER_FACE * Self::COMPONENTS)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / Self::COMPONENTS
    }

    /// Position buffer as raw bytes, ready for upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }
}

/// Builds block meshes from a voxel field.
///
/// The maker only holds immutable configuration: the node registry and the block
/// edge length. A single maker can be shared between worker threads.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cgmath::{Point3, Vector3};
/// use voxel_mesher::meshing::BlockMeshMaker;
/// use voxel_mesher::voxels::{NodeType, NodeTypeRegistry, VoxelBuffer, VoxelSample};
///
/// let mut field = VoxelBuffer::filled(Point3::new(0, 0, 0), Vector3::new(4, 4, 4), VoxelSample::air(255));
/// field.set(Point3::new(1, 1, 1), VoxelSample::solid(NodeType::STONE)).unwrap();
///
/// let maker = BlockMeshMaker::new(Arc::new(NodeTypeRegistry::default()), 3);
/// let mesh = maker.make_mesh(Point3::new(0, 0, 0), &field).unwrap();
/// assert_eq!(mesh.face_count(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct BlockMeshMaker {
    registry: Arc<NodeTypeRegistry>,
    block_size: i32,
}

impl BlockMeshMaker {
    /// Creates a maker for blocks of `block_size³` voxels.
    pub fn new(registry: Arc<NodeTypeRegistry>, block_size: i32) -> Self {
        debug_assert!(block_size > 0, "block size must be positive");
        BlockMeshMaker {
            registry,
            block_size,
        }
    }

    /// Edge length of the blocks this maker meshes.
    pub fn block_size(&self) -> i32 {
        self.block_size
    }

    /// The node registry used for face culling.
    pub fn registry(&self) -> &NodeTypeRegistry {
        &self.registry
    }

    /// Builds the mesh of the block at `block_position`.
    ///
    /// Returns `None` when the block has no visible face, and also when sampling the
    /// field faults; use `try_make_mesh` to tell the two apart.
    pub fn make_mesh<F: VoxelField + ?Sized>(
        &self,
        block_position: Point3<i32>,
        field: &F,
    ) -> Option<Mesh> {
        self.try_make_mesh(block_position, field).ok().flatten()
    }

    /// Builds the mesh of the block at `block_position`, reporting lookup faults.
    ///
    /// `Ok(None)` means the block legitimately has no visible face.
    pub fn try_make_mesh<F: VoxelField + ?Sized>(
        &self,
        block_position: Point3<i32>,
        field: &F,
    ) -> Result<Option<Mesh>, VoxelFieldError> {
        let start = Instant::now();
        let faces = self.collect_fast_faces(block_position, field)?;
        let mesh = Mesh::from_fast_faces(&faces);

        debug!(
            "Meshed block {:?}: {} faces in {:?}",
            block_position,
            faces.len(),
            start.elapsed()
        );
        Ok(mesh)
    }

    /// Sweeps the block and returns its fast faces in emission order.
    ///
    /// Three sweeps cover every face pair owned by the block:
    /// 1. rows along `+x` with far voxels at `+y`, for every `(y, z)`
    /// 2. rows along `+z` with far voxels at `+x`, for every `(x, y)`
    /// 3. rows along `+x` with far voxels at `+z`, for every `(z, y)`
    ///
    /// The block owns the faces between its voxels and their positive neighbours, so
    /// the field must also cover one voxel past the block on every positive axis.
    pub fn collect_fast_faces<F: VoxelField + ?Sized>(
        &self,
        block_position: Point3<i32>,
        field: &F,
    ) -> Result<Vec<FastFace>, VoxelFieldError> {
        let s = self.block_size;
        let min = Point3::new(
            block_position.x * s,
            block_position.y * s,
            block_position.z * s,
        );
        let side = s as usize;
        let mut faces = Vec::with_capacity(3 * side * side);

        for y in 0..s {
            for z in 0..s {
                let row = Row {
                    start: Point3::new(min.x, min.y + y, min.z + z),
                    trans_dir: Vector3::new(1, 0, 0),
                    face_dir: Vector3::new(0, 1, 0),
                    length: s,
                };
                update_fast_faces_row(&row, field, &self.registry, &mut faces)?;
            }
        }

        for x in 0..s {
            for y in 0..s {
                let row = Row {
                    start: Point3::new(min.x + x, min.y + y, min.z),
                    trans_dir: Vector3::new(0, 0, 1),
                    face_dir: Vector3::new(1, 0, 0),
                    length: s,
                };
                update_fast_faces_row(&row, field, &self.registry, &mut faces)?;
            }
        }

        for z in 0..s {
            for y in 0..s {
                let row = Row {
                    start: Point3::new(min.x, min.y + y, min.z + z),
                    trans_dir: Vector3::new(1, 0, 0),
                    face_dir: Vector3::new(0, 0, 1),
                    length: s,
                };
                update_fast_faces_row(&row, field, &self.registry, &mut faces)?;
            }
        }

        trace!("Block {:?} produced {} fast faces", block_position, faces.len());
        Ok(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        meshing::shading::face_light,
        voxels::{
            direction::Direction,
            node::{NodeType, VoxelSample},
            voxel_buffer::VoxelBuffer,
        },
    };

    fn maker(size: i32) -> BlockMeshMaker {
        BlockMeshMaker::new(Arc::new(NodeTypeRegistry::default()), size)
    }

    fn air_field(size: i32) -> VoxelBuffer {
        VoxelBuffer::filled(
            Point3::new(0, 0, 0),
            Vector3::new(size + 1, size + 1, size + 1),
            VoxelSample::air(255),
        )
    }

    #[test]
    fn empty_block_has_no_mesh() {
        let field = air_field(4);
        assert_eq!(maker(4).try_make_mesh(Point3::new(0, 0, 0), &field), Ok(None));
    }

    #[test]
    fn fully_enclosed_block_has_no_mesh() {
        let field = VoxelBuffer::filled(
            Point3::new(0, 0, 0),
            Vector3::new(5, 5, 5),
            VoxelSample::solid(NodeType::STONE),
        );
        assert!(maker(4).make_mesh(Point3::new(0, 0, 0), &field).is_none());
    }

    #[test]
    fn single_voxel_gets_one_face_per_direction() {
        let mut field = air_field(3);
        field.set(Point3::new(1, 1, 1), VoxelSample::solid(NodeType::DIRT)).unwrap();

        let faces = maker(3)
            .collect_fast_faces(Point3::new(0, 0, 0), &field)
            .unwrap();

        assert_eq!(faces.len(), 6);
        for direction in Direction::all() {
            let face = faces.iter().find(|f| f.direction == direction).unwrap();
            assert_eq!(face.colors[0][0], face_light(direction, 255));
            let extent = face.extent();
            assert_eq!(extent.x + extent.y + extent.z, 2.0);
        }
    }

    #[test]
    fn flattening_preserves_face_order_and_drops_alpha() {
        let mut field = air_field(3);
        field.set(Point3::new(1, 1, 1), VoxelSample::solid(NodeType::DIRT)).unwrap();

        let maker = maker(3);
        let faces = maker.collect_fast_faces(Point3::new(0, 0, 0), &field).unwrap();
        let mesh = maker.make_mesh(Point3::new(0, 0, 0), &field).unwrap();

        assert_eq!(mesh.positions.len(), 6 * 12);
        assert_eq!(mesh.colors.len(), 6 * 12);
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.position_bytes().len(), 6 * 12 * 4);

        for (i, face) in faces.iter().enumerate() {
            for (j, corner) in face.corners.iter().enumerate() {
                let base = (i * 4 + j) * 3;
                assert_eq!(&mesh.positions[base..base + 3], &[corner.x, corner.y, corner.z]);
                assert_eq!(&mesh.colors[base..base + 3], &face.colors[j][..3]);
            }
        }
    }

    #[test]
    fn block_position_offsets_the_sweep() {
        let mut field = VoxelBuffer::filled(
            Point3::new(3, 3, 3),
            Vector3::new(4, 4, 4),
            VoxelSample::air(255),
        );
        field.set(Point3::new(4, 4, 4), VoxelSample::solid(NodeType::STONE)).unwrap();

        let faces = maker(3)
            .collect_fast_faces(Point3::new(1, 1, 1), &field)
            .unwrap();

        assert_eq!(faces.len(), 6);
        for face in faces {
            let min = face.min_corner();
            assert!(min.x >= 4.0 && min.y >= 4.0 && min.z >= 4.0);
        }
    }

    #[test]
    fn lookup_fault_yields_no_mesh() {
        let mut field = air_field(2);
        field.set(Point3::new(0, 0, 0), VoxelSample::solid(NodeType::STONE)).unwrap();
        field.invalidate(Point3::new(2, 1, 1)).unwrap();

        let maker = maker(2);
        assert!(maker.make_mesh(Point3::new(0, 0, 0), &field).is_none());
        assert!(matches!(
            maker.try_make_mesh(Point3::new(0, 0, 0), &field),
            Err(VoxelFieldError::Unavailable { .. })
        ));
    }
}
