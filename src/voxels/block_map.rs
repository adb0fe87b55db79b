//! # Block Map Module
//!
//! The `BlockMap` is a sparse collection of blocks addressed by block position.
//! It is the authoritative voxel store: meshing tasks read from it by copying a
//! block and its halo into a `VoxelBuffer`, and edits go through `set_node`, which
//! reports every block whose mesh the edit invalidates.
//!
//! ## Halo
//!
//! Meshing block `b` samples each voxel of `b` together with its `+x`, `+y` and `+z`
//! neighbours, so it reads one layer of the next block on each positive axis. The
//! faces on a block's minimum sides are produced by its negative neighbours.

use std::collections::HashMap;

use cgmath::{Point3, Vector3};

use crate::core::MtResource;

use super::block::{Block, GenerationMethod, MAX_BLOCK_SIZE};
use super::node::VoxelSample;
use super::voxel_buffer::VoxelBuffer;
use super::voxel_field::{VoxelField, VoxelFieldError};

/// A sparse voxel map made of equally sized blocks.
pub struct BlockMap {
    /// Loaded blocks, keyed by block position. Each block sits behind its own lock so
    /// edits to one block never stall readers of another.
    blocks: HashMap<Point3<i32>, MtResource<Block>>,
    block_size: i32,
    generation_method: GenerationMethod,
    seed: u32,
}

impl BlockMap {
    /// Creates an empty map whose new blocks are generated with `generation_method`.
    ///
    /// `block_size` is clamped to `1..=MAX_BLOCK_SIZE`.
    pub fn new(block_size: i32, generation_method: GenerationMethod, seed: u32) -> Self {
        BlockMap {
            blocks: HashMap::new(),
            block_size: block_size.clamp(1, MAX_BLOCK_SIZE),
            generation_method,
            seed,
        }
    }

    /// Edge length of every block, in nodes.
    pub fn block_size(&self) -> i32 {
        self.block_size
    }

    /// Number of loaded blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no block is loaded.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Positions of every loaded block, in no particular order.
    pub fn block_positions(&self) -> Vec<Point3<i32>> {
        self.blocks.keys().copied().collect()
    }

    /// Generates and adds a block at `position` unless one is already loaded.
    ///
    /// Returns `true` if a block was generated.
    pub fn add_block_at(&mut self, position: Point3<i32>) -> bool {
        if self.blocks.contains_key(&position) {
            return false;
        }

        let block = Block::generate(position, self.block_size, self.generation_method, self.seed);
        self.blocks.insert(position, MtResource::new(block));
        true
    }

    /// Inserts an already built block, replacing any block at the same position.
    ///
    /// Blocks whose size does not match the map are rejected and handed back.
    pub fn insert_block(&mut self, block: Block) -> Result<(), Block> {
        if block.size() != self.block_size {
            return Err(block);
        }
        self.blocks.insert(block.position, MtResource::new(block));
        Ok(())
    }

    /// Returns the block at `position`, if loaded.
    pub fn get_block_at(&self, position: Point3<i32>) -> Option<MtResource<Block>> {
        self.blocks.get(&position).cloned()
    }

    /// Unloads the block at `position`, returning it if it was loaded.
    pub fn remove_block_at(&mut self, position: Point3<i32>) -> Option<MtResource<Block>> {
        self.blocks.remove(&position)
    }

    /// Splits a world node position into its block position and block-relative offset.
    pub fn split_position(&self, world: Point3<i32>) -> (Point3<i32>, Vector3<i32>) {
        let s = self.block_size;
        (
            Point3::new(world.x.div_euclid(s), world.y.div_euclid(s), world.z.div_euclid(s)),
            Vector3::new(world.x.rem_euclid(s), world.y.rem_euclid(s), world.z.rem_euclid(s)),
        )
    }

    /// Reads the node at a world position.
    pub fn get_node(&self, world: Point3<i32>) -> Result<VoxelSample, VoxelFieldError> {
        let (block_position, local) = self.split_position(world);
        let block = self
            .blocks
            .get(&block_position)
            .ok_or(VoxelFieldError::Unavailable { position: world })?;
        let node = block.get().get_node(local.x, local.y, local.z);
        node.ok_or(VoxelFieldError::OutOfBounds { position: world })
    }

    /// Writes the node at a world position.
    ///
    /// Returns the positions of all loaded blocks whose mesh depends on that node: the
    /// owning block, plus the negative neighbour on every axis where the node sits on
    /// the owning block's minimum face.
    pub fn set_node(
        &self,
        world: Point3<i32>,
        sample: VoxelSample,
    ) -> Result<Vec<Point3<i32>>, VoxelFieldError> {
        let (block_position, local) = self.split_position(world);
        let block = self
            .blocks
            .get(&block_position)
            .ok_or(VoxelFieldError::Unavailable { position: world })?;
        block.get_mut().set_node(local.x, local.y, local.z, sample);

        let mut affected = vec![block_position];
        let neighbours = [
            (local.x, Vector3::new(-1, 0, 0)),
            (local.y, Vector3::new(0, -1, 0)),
            (local.z, Vector3::new(0, 0, -1)),
        ];
        for (coordinate, offset) in neighbours {
            let neighbour = block_position + offset;
            if coordinate == 0 && self.blocks.contains_key(&neighbour) {
                affected.push(neighbour);
            }
        }
        Ok(affected)
    }

    /// Copies the block at `position` and its one-node halo on the positive side of
    /// every axis into a dense buffer.
    ///
    /// Cells belonging to blocks that are not loaded stay unavailable, so meshing the
    /// returned buffer faults instead of guessing at missing neighbours.
    pub fn copy_to_buffer(&self, position: Point3<i32>) -> VoxelBuffer {
        let s = self.block_size;
        let min = Point3::new(position.x * s, position.y * s, position.z * s);
        let mut buffer = VoxelBuffer::new(min, Vector3::new(s + 1, s + 1, s + 1));

        for dz in 0..=s {
            for dy in 0..=s {
                for dx in 0..=s {
                    let world = min + Vector3::new(dx, dy, dz);
                    if let Ok(sample) = self.get_node(world) {
                        let written = buffer.set(world, sample);
                        debug_assert!(written.is_ok(), "halo copy outside buffer at {:?}", world);
                    }
                }
            }
        }
        buffer
    }
}

impl VoxelField for BlockMap {
    fn get(&self, position: Point3<i32>) -> Result<VoxelSample, VoxelFieldError> {
        self.get_node(position)
    }
}
