//! Per-direction face shading.
//!
//! Faces are lit flat: every corner of a face gets the same brightness, derived from
//! the light level of the voxel the face looks into and a fixed factor per direction
//! so that the sides of a cube read differently.

use crate::voxels::direction::Direction;

/// Brightness factor applied to faces pointing along the x axis.
pub const EAST_WEST_ATTENUATION: f32 = 0.78;
/// Brightness factor applied to faces pointing along the y axis.
pub const NORTH_SOUTH_ATTENUATION: f32 = 0.56;
/// Brightness factor applied to downward faces.
pub const BOTTOM_ATTENUATION: f32 = 0.34;
/// Brightness factor applied to upward faces.
pub const TOP_ATTENUATION: f32 = 1.0;

/// Brightness factor for a face direction.
pub fn attenuation(direction: Direction) -> f32 {
    match direction {
        Direction::EAST | Direction::WEST => EAST_WEST_ATTENUATION,
        Direction::NORTH | Direction::SOUTH => NORTH_SOUTH_ATTENUATION,
        Direction::BOTTOM => BOTTOM_ATTENUATION,
        Direction::TOP => TOP_ATTENUATION,
    }
}

/// Shaded 8-bit brightness of a face pointing in `direction` and lit by `light`.
pub fn face_light(direction: Direction, light: u8) -> u8 {
    let lightf = (light as f32 / 255.0).clamp(0.0, 1.0) * attenuation(direction);
    (lightf * 255.0) as u8
}
