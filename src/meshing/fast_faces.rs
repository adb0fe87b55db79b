//! Row tessellation: turns one straight line of voxel pairs into merged fast faces.
//!
//! ```text
//!   o----o----o----o----o          o----o--------------o
//!   |\ A  \ B  \ B  \ B  \         |\ A  \      B       \
//!   o o----o----o----o----o  ===>  o o----o--------------o
//!    \| A  | B  | B  | B  |         \| A  |      B       |
//!     o----o----o----o----o          o----o--------------o
//! ```
//!
//! Every step of a row looks at a pair: the voxel under the cursor ("near") and the
//! voxel one step along the face direction ("far"). Consecutive pairs that look the
//! same are merged into one face stretched along the row.

use cgmath::{Point3, Vector3};

use crate::voxels::{
    direction::Direction,
    node::{NodeTypeRegistry, VoxelSample},
    voxel_field::{VoxelField, VoxelFieldError},
};

use super::{
    face::FastFace,
    shading::face_light,
    visibility::{compare_faces, FaceVisibility},
};

/// One row to tessellate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    /// Absolute position of the first near voxel.
    pub start: Point3<i32>,
    /// Step between consecutive voxels of the row.
    pub trans_dir: Vector3<i32>,
    /// Offset from a near voxel to its far voxel.
    pub face_dir: Vector3<i32>,
    /// Number of voxels in the row.
    pub length: i32,
}

fn same_pair(current: &(VoxelSample, VoxelSample), next: &(VoxelSample, VoxelSample)) -> bool {
    current.0.same_appearance(&next.0) && current.1.same_appearance(&next.1)
}

fn sample_pair<F: VoxelField + ?Sized>(
    field: &F,
    position: Point3<i32>,
    face_dir: Vector3<i32>,
) -> Result<(VoxelSample, VoxelSample), VoxelFieldError> {
    Ok((field.get(position)?, field.get(position + face_dir)?))
}

/// Builds the face for a finished run ending at `end`, or `None` if the run is hidden.
fn make_fast_face(
    row: &Row,
    pair: &(VoxelSample, VoxelSample),
    end: Vector3<i32>,
    run_length: i32,
    registry: &NodeTypeRegistry,
) -> Option<FastFace> {
    let (near, far) = pair;
    let face_direction = Direction::from_vector(row.face_dir);

    let (light, direction, shift) = match compare_faces(near, far, registry) {
        FaceVisibility::Hidden => return None,
        FaceVisibility::NearFacing => (face_light(face_direction, far.light), face_direction, false),
        FaceVisibility::FarFacing => {
            let direction = face_direction.opposite();
            (face_light(direction, near.light), direction, true)
        }
    };

    // The run started `run_length - 1` steps before its last voxel.
    let ff_start = row.start + end - row.trans_dir * (run_length - 1);
    let position = Point3::new(ff_start.x as f32, ff_start.y as f32, ff_start.z as f32);

    let run = run_length as f32;
    let scale = Vector3::new(
        if row.trans_dir.x != 0 { run } else { 1.0 },
        if row.trans_dir.y != 0 { run } else { 1.0 },
        if row.trans_dir.z != 0 { run } else { 1.0 },
    );

    Some(FastFace::new(light, position, direction, shift, scale))
}

/// Tessellates one row, appending a fast face for every visible run to `faces`.
///
/// A run ends where the next pair differs in type or meta on either side, and always
/// at the end of the row. The light of a merged face is taken from the last pair of
/// its run, from the voxel the face looks into. The face's own voxel is usually solid
/// and unlit, so its light says nothing about how bright the face should be. Any voxel
/// lookup fault aborts the row and is returned as is.
pub fn update_fast_faces_row<F: VoxelField + ?Sized>(
    row: &Row,
    field: &F,
    registry: &NodeTypeRegistry,
    faces: &mut Vec<FastFace>,
) -> Result<(), VoxelFieldError> {
    if row.length <= 0 {
        return Ok(());
    }

    let mut cur_pos = Vector3::new(0, 0, 0);
    let mut current = sample_pair(field, row.start, row.face_dir)?;
    let mut continuous_faces_count = 0;

    for i in 0..row.length {
        // The last voxel always cuts the run, so there is nothing to compare it with.
        let next = if i != row.length - 1 {
            Some(sample_pair(
                field,
                row.start + cur_pos + row.trans_dir,
                row.face_dir,
            )?)
        } else {
            None
        };
        let next_is_different = next
            .as_ref()
            .map_or(true, |next| !same_pair(&current, next));

        continuous_faces_count += 1;

        if next_is_different {
            if let Some(face) =
                make_fast_face(row, &current, cur_pos, continuous_faces_count, registry)
            {
                faces.push(face);
            }
            continuous_faces_count = 0;
        }

        if let Some(pair) = next {
            current = pair;
        }
        cur_pos += row.trans_dir;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxels::{node::NodeType, voxel_buffer::VoxelBuffer};

    const LENGTH: i32 = 6;

    /// A 6x2x1 buffer: the row runs along x at y = 0, far voxels sit at y = 1.
    fn row_buffer(near: impl Fn(i32) -> VoxelSample, far: impl Fn(i32) -> VoxelSample) -> VoxelBuffer {
        let mut buffer = VoxelBuffer::new(Point3::new(0, 0, 0), Vector3::new(LENGTH, 2, 1));
        for x in 0..LENGTH {
            buffer.set(Point3::new(x, 0, 0), near(x)).unwrap();
            buffer.set(Point3::new(x, 1, 0), far(x)).unwrap();
        }
        buffer
    }

    fn sweep(buffer: &VoxelBuffer) -> Result<Vec<FastFace>, VoxelFieldError> {
        let row = Row {
            start: Point3::new(0, 0, 0),
            trans_dir: Vector3::new(1, 0, 0),
            face_dir: Vector3::new(0, 1, 0),
            length: LENGTH,
        };
        let mut faces = Vec::new();
        update_fast_faces_row(&row, buffer, &NodeTypeRegistry::default(), &mut faces)?;
        Ok(faces)
    }

    #[test]
    fn identical_pairs_merge_into_one_face() {
        let buffer = row_buffer(|_| VoxelSample::solid(NodeType::STONE), |_| VoxelSample::air(255));
        let faces = sweep(&buffer).unwrap();

        assert_eq!(faces.len(), 1);
        let face = faces[0];
        assert_eq!(face.direction, Direction::NORTH);
        assert_eq!(face.extent(), Vector3::new(LENGTH as f32, 0., 1.));
        assert_eq!(face.min_corner(), Point3::new(0., 1., 0.));
        assert_eq!(face.colors[0][0], face_light(Direction::NORTH, 255));
    }

    #[test]
    fn alternating_pairs_do_not_merge() {
        let buffer = row_buffer(
            |x| {
                if x % 2 == 0 {
                    VoxelSample::solid(NodeType::STONE)
                } else {
                    VoxelSample::solid(NodeType::DIRT)
                }
            },
            |_| VoxelSample::air(255),
        );
        let faces = sweep(&buffer).unwrap();

        assert_eq!(faces.len(), LENGTH as usize);
        for (x, face) in faces.iter().enumerate() {
            assert_eq!(face.extent(), Vector3::new(1., 0., 1.));
            assert_eq!(face.min_corner(), Point3::new(x as f32, 1., 0.));
        }
    }

    #[test]
    fn far_side_faces_are_shifted_onto_the_shared_boundary() {
        let buffer = row_buffer(|_| VoxelSample::air(255), |_| VoxelSample::solid(NodeType::GRASS));
        let faces = sweep(&buffer).unwrap();

        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].direction, Direction::SOUTH);
        for corner in faces[0].corners {
            assert_eq!(corner.y, 1.);
        }
        assert_eq!(faces[0].colors[0][0], face_light(Direction::SOUTH, 255));
    }

    #[test]
    fn hidden_runs_emit_nothing_but_still_split() {
        // stone|stone|air|air|stone|stone under air: the middle run is hidden.
        let buffer = row_buffer(
            |x| {
                if x == 2 || x == 3 {
                    VoxelSample::air(255)
                } else {
                    VoxelSample::solid(NodeType::STONE)
                }
            },
            |_| VoxelSample::air(255),
        );
        let faces = sweep(&buffer).unwrap();

        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].min_corner(), Point3::new(0., 1., 0.));
        assert_eq!(faces[0].extent().x, 2.);
        assert_eq!(faces[1].min_corner(), Point3::new(4., 1., 0.));
        assert_eq!(faces[1].extent().x, 2.);
    }

    #[test]
    fn meta_differences_split_runs_on_either_side() {
        let meta_at = |x: i32| if x < 3 { 0 } else { 1 };

        let near_split = row_buffer(
            |x| VoxelSample::new(NodeType::STONE, meta_at(x), 0),
            |_| VoxelSample::air(255),
        );
        let far_split = row_buffer(
            |_| VoxelSample::air(255),
            |x| VoxelSample::new(NodeType::STONE, meta_at(x), 0),
        );

        for buffer in [near_split, far_split] {
            let faces = sweep(&buffer).unwrap();
            assert_eq!(faces.len(), 2);
            assert_eq!(faces[0].min_corner().x, 0.);
            assert_eq!(faces[0].extent().x, 3.);
            assert_eq!(faces[1].min_corner().x, 3.);
            assert_eq!(faces[1].extent().x, 3.);
        }
    }

    #[test]
    fn light_differences_alone_do_not_split_runs() {
        let buffer = row_buffer(|_| VoxelSample::solid(NodeType::DIRT), |x| VoxelSample::air(x as u8 * 40));
        let faces = sweep(&buffer).unwrap();

        assert_eq!(faces.len(), 1);
        // The last pair of the run provides the light.
        let last_light = ((LENGTH - 1) * 40) as u8;
        assert_eq!(faces[0].colors[0][0], face_light(Direction::NORTH, last_light));
    }

    #[test]
    fn lookup_faults_abort_the_row() {
        let mut buffer = row_buffer(|_| VoxelSample::solid(NodeType::DIRT), |_| VoxelSample::air(255));
        buffer.invalidate(Point3::new(3, 1, 0)).unwrap();

        assert_eq!(
            sweep(&buffer),
            Err(VoxelFieldError::Unavailable {
                position: Point3::new(3, 1, 0)
            })
        );
    }
}
