//! # Block Module
//!
//! A block is a cube of `size³` nodes, the unit of map storage and of meshing.
//! This module holds the block storage and the generators used to fill new blocks.
//!
//! Nodes are stored densely in x-then-y-then-z order. Solid nodes are generated
//! unlit and empty nodes fully lit, so faces looking into open air receive full
//! light before direction shading.

use cgmath::Point3;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use super::node::{NodeType, VoxelSample, MAX_LIGHT};

/// Largest supported block edge length, in nodes.
pub const MAX_BLOCK_SIZE: i32 = 256;

/// Threshold above which Perlin noise is considered solid for terrain generation.
pub const PERLIN_POSITIVE_THRESHOLD: f64 = 0.2;
/// Threshold below which Perlin noise is considered solid for terrain generation.
pub const PERLIN_NEGATIVE_THRESHOLD: f64 = -0.2;
/// Scaling factor applied to world coordinates when sampling Perlin noise.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;
/// Fraction of air nodes in randomly generated blocks.
pub const RANDOM_SPARSENESS: f64 = 0.9;

/// The method used to fill newly created blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMethod {
    /// 3D Perlin noise terrain with caves and overhangs.
    #[default]
    Perlin,
    /// Alternating solid and air nodes on all three axes.
    Checkerboard,
    /// Every node solid.
    Solid,
    /// Every node air.
    Empty,
    /// Mostly air, with random solid nodes.
    Random,
}

/// A cube of nodes at a block position.
#[derive(Clone, Debug)]
pub struct Block {
    /// Position of this block in block coordinates (not node coordinates).
    pub position: Point3<i32>,
    size: i32,
    nodes: Vec<VoxelSample>,
}

impl Block {
    /// Creates a block filled with the same sample. `size` is clamped to
    /// `1..=MAX_BLOCK_SIZE`.
    pub fn filled(position: Point3<i32>, size: i32, sample: VoxelSample) -> Self {
        let size = size.clamp(1, MAX_BLOCK_SIZE);
        let side = size as usize;
        Block {
            position,
            size,
            nodes: vec![sample; side * side * side],
        }
    }

    /// Creates a completely empty, fully lit block.
    pub fn empty(position: Point3<i32>, size: i32) -> Self {
        Block::filled(position, size, VoxelSample::air(MAX_LIGHT))
    }

    /// Creates a block where every node is dirt.
    pub fn solid(position: Point3<i32>, size: i32) -> Self {
        Block::filled(position, size, VoxelSample::solid(NodeType::DIRT))
    }

    /// Creates a block with a 3D checkerboard pattern of dirt and air.
    ///
    /// The pattern is aligned to world coordinates, so neighbouring blocks continue it.
    pub fn checkerboard(position: Point3<i32>, size: i32) -> Self {
        let mut block = Block::empty(position, size);
        let origin = block.origin();
        block.fill_with(|x, y, z| {
            if (origin.x + x + origin.y + y + origin.z + z).rem_euclid(2) == 0 {
                VoxelSample::solid(NodeType::DIRT)
            } else {
                VoxelSample::air(MAX_LIGHT)
            }
        });
        block
    }

    /// Creates a block with randomly placed solid nodes.
    ///
    /// The generator is seeded from `seed` and the block position, so the same
    /// inputs always produce the same block.
    pub fn random(position: Point3<i32>, size: i32, seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(Self::position_seed(position, seed));
        let mut block = Block::empty(position, size);
        block.fill_with(|_, _, _| {
            if rng.f64() < RANDOM_SPARSENESS {
                VoxelSample::air(MAX_LIGHT)
            } else {
                VoxelSample::solid(NodeType::random_solid(&mut rng))
            }
        });
        block
    }

    /// Generates a block using Perlin noise for natural-looking terrain.
    ///
    /// Nodes whose noise sample falls outside the
    /// `[PERLIN_NEGATIVE_THRESHOLD, PERLIN_POSITIVE_THRESHOLD]` band are solid, with a
    /// type picked by a generator seeded from the block position.
    pub fn perlin(position: Point3<i32>, size: i32, seed: u32) -> Self {
        let perlin = Perlin::new(seed);
        let mut rng = fastrand::Rng::with_seed(Self::position_seed(position, seed as u64));
        let mut block = Block::empty(position, size);
        let origin = block.origin();

        block.fill_with(|x, y, z| {
            let world = Point3::new(origin.x + x, origin.y + y, origin.z + z);
            let sample = perlin.get(Self::to_perlin_pos(world, PERLIN_SCALE_FACTOR));
            if !(PERLIN_NEGATIVE_THRESHOLD..=PERLIN_POSITIVE_THRESHOLD).contains(&sample) {
                VoxelSample::solid(NodeType::random_solid(&mut rng))
            } else {
                VoxelSample::air(MAX_LIGHT)
            }
        });
        block
    }

    /// Creates a block with the given generation method.
    pub fn generate(position: Point3<i32>, size: i32, method: GenerationMethod, seed: u32) -> Self {
        match method {
            GenerationMethod::Perlin => Block::perlin(position, size, seed),
            GenerationMethod::Checkerboard => Block::checkerboard(position, size),
            GenerationMethod::Solid => Block::solid(position, size),
            GenerationMethod::Empty => Block::empty(position, size),
            GenerationMethod::Random => Block::random(position, size, seed as u64),
        }
    }

    fn to_perlin_pos(pos: Point3<i32>, scale_factor: f64) -> [f64; 3] {
        [
            (pos.x as f64 * scale_factor),
            (pos.y as f64 * scale_factor),
            (pos.z as f64 * scale_factor),
        ]
    }

    fn position_seed(position: Point3<i32>, seed: u64) -> u64 {
        let x = position.x as u32 as u64;
        let y = position.y as u32 as u64;
        let z = position.z as u32 as u64;
        seed ^ x.wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ y.wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
            ^ z.wrapping_mul(0x1656_67B1_9E37_79F9)
    }

    fn fill_with(&mut self, mut generator: impl FnMut(i32, i32, i32) -> VoxelSample) {
        for z in 0..self.size {
            for y in 0..self.size {
                for x in 0..self.size {
                    let index = self.index(x, y, z);
                    self.nodes[index] = generator(x, y, z);
                }
            }
        }
    }

    fn index(&self, x: i32, y: i32, z: i32) -> usize {
        let side = self.size as usize;
        x as usize + side * (y as usize + side * z as usize)
    }

    fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        (0..self.size).contains(&x) && (0..self.size).contains(&y) && (0..self.size).contains(&z)
    }

    /// Number of nodes along each edge.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// World position of the node at local `(0, 0, 0)`.
    pub fn origin(&self) -> Point3<i32> {
        Point3::new(
            self.position.x * self.size,
            self.position.y * self.size,
            self.position.z * self.size,
        )
    }

    /// Gets the node at block-relative coordinates, or `None` outside the block.
    pub fn get_node(&self, x: i32, y: i32, z: i32) -> Option<VoxelSample> {
        if !self.in_bounds(x, y, z) {
            return None;
        }
        Some(self.nodes[self.index(x, y, z)])
    }

    /// Sets the node at block-relative coordinates. Returns `false` outside the block.
    pub fn set_node(&mut self, x: i32, y: i32, z: i32, sample: VoxelSample) -> bool {
        if !self.in_bounds(x, y, z) {
            return false;
        }
        let index = self.index(x, y, z);
        self.nodes[index] = sample;
        true
    }

    /// Number of nodes that are not air.
    pub fn solid_count(&self) -> usize {
        self.nodes.iter().filter(|node| !node.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_generators_fill_as_expected() {
        let position = Point3::new(0, 0, 0);

        assert_eq!(Block::empty(position, 4).solid_count(), 0);
        assert_eq!(Block::solid(position, 4).solid_count(), 64);
        assert_eq!(Block::checkerboard(position, 4).solid_count(), 32);
    }

    #[test]
    fn checkerboard_alternates_along_every_axis() {
        let block = Block::checkerboard(Point3::new(1, 0, 0), 3);

        for z in 0..3 {
            for y in 0..3 {
                for x in 0..3 {
                    let here = block.get_node(x, y, z).unwrap().is_empty();
                    for (nx, ny, nz) in [(x + 1, y, z), (x, y + 1, z), (x, y, z + 1)] {
                        if let Some(next) = block.get_node(nx, ny, nz) {
                            assert_ne!(here, next.is_empty(), "({}, {}, {})", x, y, z);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn oversized_blocks_are_clamped() {
        let block = Block::empty(Point3::new(0, 0, 0), i32::MAX);
        assert_eq!(block.size(), MAX_BLOCK_SIZE);
        assert!(block.get_node(MAX_BLOCK_SIZE - 1, 0, 0).is_some());
        assert!(block.get_node(MAX_BLOCK_SIZE, 0, 0).is_none());
    }

    #[test]
    fn random_and_perlin_are_deterministic() {
        let position = Point3::new(2, -1, 3);

        let a = Block::random(position, 8, 11);
        let b = Block::random(position, 8, 11);
        assert_eq!(a.nodes, b.nodes);

        let c = Block::perlin(position, 8, 5);
        let d = Block::perlin(position, 8, 5);
        assert_eq!(c.nodes, d.nodes);
    }

    #[test]
    fn solid_nodes_are_dark_and_air_is_lit() {
        let block = Block::random(Point3::new(0, 0, 0), 6, 3);
        for z in 0..6 {
            for y in 0..6 {
                for x in 0..6 {
                    let node = block.get_node(x, y, z).unwrap();
                    let expected = if node.is_empty() { MAX_LIGHT } else { 0 };
                    assert_eq!(node.light, expected);
                }
            }
        }
    }

    #[test]
    fn node_access_is_bounds_checked() {
        let mut block = Block::empty(Point3::new(0, 0, 0), 2);

        assert!(block.get_node(2, 0, 0).is_none());
        assert!(block.get_node(0, -1, 0).is_none());
        assert!(!block.set_node(0, 0, 2, VoxelSample::solid(NodeType::STONE)));
        assert!(block.set_node(1, 1, 1, VoxelSample::solid(NodeType::STONE)));
        assert_eq!(block.solid_count(), 1);
    }

    #[test]
    fn origin_scales_block_position() {
        let block = Block::empty(Point3::new(-1, 2, 0), 16);
        assert_eq!(block.origin(), Point3::new(-16, 32, 0));
    }
}
