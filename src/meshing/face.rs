use cgmath::{Point3, Vector3};

use crate::voxels::direction::Direction;

/// Unit-cube corner offsets of the face pointing in each direction, indexed by
/// `Direction as usize`.
///
/// The per-direction corner order is kept literally as it is consumed downstream;
/// it is not consistent across directions, so backface culling of the resulting
/// quads is unreliable for some of them.
pub const FACE_VERTICES: [[[f32; 3]; 4]; 6] = [
    // EAST
    [[1., 0., 0.], [1., 0., 1.], [1., 1., 1.], [1., 1., 0.]],
    // WEST
    [[0., 0., 1.], [0., 0., 0.], [0., 1., 0.], [0., 1., 1.]],
    // NORTH
    [[0., 1., 0.], [1., 1., 0.], [1., 1., 1.], [0., 1., 1.]],
    // SOUTH
    [[0., 0., 1.], [1., 0., 1.], [1., 0., 0.], [0., 0., 0.]],
    // TOP
    [[1., 0., 1.], [0., 0., 1.], [0., 1., 1.], [1., 1., 1.]],
    // BOTTOM
    [[0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.]],
];

/// Returns the four unit-cube corners of the face pointing in `direction`.
pub fn face_vertices(direction: Direction) -> [Point3<f32>; 4] {
    FACE_VERTICES[direction as usize].map(|[x, y, z]| Point3::new(x, y, z))
}

/// Returns the four unit-cube corners of the face pointing along `vector`.
///
/// `vector` must have exactly two zero components and a ±1 third one.
pub fn face_vertices_from_vector(vector: Vector3<i32>) -> [Point3<f32>; 4] {
    face_vertices(Direction::from_vector(vector))
}

/// One merged quad covering a run of identical faces along a row.
///
/// Fast faces only live while a single block is being meshed; they are flattened
/// into a `Mesh` and dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FastFace {
    /// Absolute corner positions, in the geometry table's order for `direction`.
    pub corners: [Point3<f32>; 4],
    /// RGBA color of each corner.
    pub colors: [[u8; 4]; 4],
    /// Which way the face points.
    pub direction: Direction,
}

impl FastFace {
    /// Builds a face of the given direction.
    ///
    /// # Arguments
    /// * `light` - Shaded brightness in `0..=255`, applied to every corner
    /// * `position` - Absolute origin of the unit cell the face starts at
    /// * `direction` - Which way the face points
    /// * `shift` - Whether to translate the face by `-direction` before placing it,
    ///   used when the face belongs to the far voxel of a pair
    /// * `scale` - Size of the face along each axis; the run length along the
    ///   row axis and `1` elsewhere
    pub fn new(
        light: u8,
        position: Point3<f32>,
        direction: Direction,
        shift: bool,
        scale: Vector3<f32>,
    ) -> Self {
        let position = if shift {
            let v = direction.vector();
            position - Vector3::new(v.x as f32, v.y as f32, v.z as f32)
        } else {
            position
        };

        let corners = face_vertices(direction).map(|vertex| {
            Point3::new(
                vertex.x * scale.x + position.x,
                vertex.y * scale.y + position.y,
                vertex.z * scale.z + position.z,
            )
        });

        FastFace {
            corners,
            colors: [[light, light, light, 255]; 4],
            direction,
        }
    }

    /// Axis-aligned size of the quad. The component along `direction` is always zero.
    pub fn extent(&self) -> Vector3<f32> {
        let mut min = self.corners[0];
        let mut max = self.corners[0];
        for corner in &self.corners[1..] {
            min = Point3::new(min.x.min(corner.x), min.y.min(corner.y), min.z.min(corner.z));
            max = Point3::new(max.x.max(corner.x), max.y.max(corner.y), max.z.max(corner.z));
        }
        max - min
    }

    /// Lowest corner of the quad.
    pub fn min_corner(&self) -> Point3<f32> {
        self.corners.iter().fold(self.corners[0], |min, corner| {
            Point3::new(min.x.min(corner.x), min.y.min(corner.y), min.z.min(corner.z))
        })
    }
}
