//! # Direction Module
//!
//! The six axis-aligned directions a voxel face can point to. The map is z-up:
//! `TOP` is `+z`, `NORTH` is `+y` and `EAST` is `+x`.

use cgmath::Vector3;
use num_derive::FromPrimitive;

/// One of the six axis-aligned face directions.
///
/// Each variant is associated with a unit vector that has exactly two zero
/// components. The discriminants index the face geometry table.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum Direction {
    /// Facing positive X
    EAST = 0,

    /// Facing negative X
    WEST = 1,

    /// Facing positive Y
    NORTH = 2,

    /// Facing negative Y
    SOUTH = 3,

    /// Facing positive Z
    TOP = 4,

    /// Facing negative Z
    BOTTOM = 5,
}

impl Direction {
    /// Returns all six directions in discriminant order.
    pub fn all() -> [Direction; 6] {
        [
            Direction::EAST,
            Direction::WEST,
            Direction::NORTH,
            Direction::SOUTH,
            Direction::TOP,
            Direction::BOTTOM,
        ]
    }

    /// Converts a table index back into a direction.
    pub fn from_index(index: u8) -> Option<Self> {
        num::FromPrimitive::from_u8(index)
    }

    /// The unit vector pointing out of a face with this direction.
    pub fn vector(self) -> Vector3<i32> {
        match self {
            Direction::EAST => Vector3::new(1, 0, 0),
            Direction::WEST => Vector3::new(-1, 0, 0),
            Direction::NORTH => Vector3::new(0, 1, 0),
            Direction::SOUTH => Vector3::new(0, -1, 0),
            Direction::TOP => Vector3::new(0, 0, 1),
            Direction::BOTTOM => Vector3::new(0, 0, -1),
        }
    }

    /// The direction pointing the other way.
    pub fn opposite(self) -> Self {
        match self {
            Direction::EAST => Direction::WEST,
            Direction::WEST => Direction::EAST,
            Direction::NORTH => Direction::SOUTH,
            Direction::SOUTH => Direction::NORTH,
            Direction::TOP => Direction::BOTTOM,
            Direction::BOTTOM => Direction::TOP,
        }
    }

    /// Whether `v` has exactly one non-zero component and that component is ±1.
    pub fn is_unit_axis(v: Vector3<i32>) -> bool {
        let non_zero = [v.x, v.y, v.z].iter().filter(|c| **c != 0).count();
        non_zero == 1 && v.x.abs() + v.y.abs() + v.z.abs() == 1
    }

    /// Resolves an axis-aligned unit vector to its direction.
    ///
    /// Passing anything other than a unit axis vector is a caller bug: debug builds
    /// assert, release builds resolve by the first non-zero axis and otherwise fall
    /// back to `TOP`.
    pub fn from_vector(v: Vector3<i32>) -> Self {
        debug_assert!(
            Self::is_unit_axis(v),
            "face direction {:?} is not an axis-aligned unit vector",
            v
        );

        if v.x < 0 {
            Direction::WEST
        } else if v.x > 0 {
            Direction::EAST
        } else if v.y < 0 {
            Direction::SOUTH
        } else if v.y > 0 {
            Direction::NORTH
        } else if v.z < 0 {
            Direction::BOTTOM
        } else {
            Direction::TOP
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_round_trip() {
        for direction in Direction::all() {
            assert!(Direction::is_unit_axis(direction.vector()));
            assert_eq!(Direction::from_vector(direction.vector()), direction);
            assert_eq!(Direction::from_index(direction as u8), Some(direction));
        }
    }

    #[test]
    fn opposite_negates_the_vector() {
        for direction in Direction::all() {
            assert_eq!(direction.opposite().vector(), -direction.vector());
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn rejects_non_axis_vectors() {
        assert!(!Direction::is_unit_axis(Vector3::new(1, 1, 0)));
        assert!(!Direction::is_unit_axis(Vector3::new(0, 0, 0)));
        assert!(!Direction::is_unit_axis(Vector3::new(0, 2, 0)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not an axis-aligned unit vector")]
    fn malformed_vector_asserts_in_debug() {
        Direction::from_vector(Vector3::new(1, 0, 1));
    }
}
