//! # Voxel Buffer Module
//!
//! A dense, owned snapshot of a box-shaped region of voxels. Meshing a block works on
//! a buffer holding the block plus its halo, so workers never hold a map lock while
//! sweeping.
//!
//! ## Availability
//!
//! Next to the samples, a bit vector (1 bit per cell) records which cells were actually
//! written. Reading a cell that was never written is a fault rather than silently
//! returning air, because meshing against missing neighbour data would produce faces
//! that disappear once the neighbour loads.

use bitvec::prelude::BitVec;
use cgmath::{Point3, Vector3};

use super::node::VoxelSample;
use super::voxel_field::{VoxelField, VoxelFieldError};

/// A dense box of voxels starting at `min` and spanning `size` cells on each axis.
#[derive(Clone, Debug)]
pub struct VoxelBuffer {
    min: Point3<i32>,
    size: Vector3<i32>,
    nodes: Vec<VoxelSample>,
    available: BitVec,
}

impl VoxelBuffer {
    /// Creates a buffer where no cell is available yet.
    ///
    /// Non-positive sizes produce an empty buffer in which every lookup is out of bounds.
    pub fn new(min: Point3<i32>, size: Vector3<i32>) -> Self {
        let size = Vector3::new(size.x.max(0), size.y.max(0), size.z.max(0));
        let volume = size.x as usize * size.y as usize * size.z as usize;
        VoxelBuffer {
            min,
            size,
            nodes: vec![VoxelSample::default(); volume],
            available: BitVec::repeat(false, volume),
        }
    }

    /// Creates a buffer where every cell is available and holds `sample`.
    pub fn filled(min: Point3<i32>, size: Vector3<i32>, sample: VoxelSample) -> Self {
        let mut buffer = VoxelBuffer::new(min, size);
        buffer.fill(sample);
        buffer
    }

    /// Overwrites every cell with `sample` and marks all of them available.
    pub fn fill(&mut self, sample: VoxelSample) {
        self.nodes.fill(sample);
        self.available.fill(true);
    }

    /// Lowest corner covered by the buffer.
    pub fn min(&self) -> Point3<i32> {
        self.min
    }

    /// Number of cells along each axis.
    pub fn size(&self) -> Vector3<i32> {
        self.size
    }

    /// Whether `position` lies inside the covered box.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.index_of(position).is_some()
    }

    /// Number of cells holding written data.
    pub fn available_count(&self) -> usize {
        self.available.count_ones()
    }

    fn index_of(&self, position: Point3<i32>) -> Option<usize> {
        let local = position - self.min;
        if local.x < 0
            || local.y < 0
            || local.z < 0
            || local.x >= self.size.x
            || local.y >= self.size.y
            || local.z >= self.size.z
        {
            return None;
        }
        let (sx, sy) = (self.size.x as usize, self.size.y as usize);
        Some(local.x as usize + sx * (local.y as usize + sy * local.z as usize))
    }

    /// Writes a sample and marks its cell available.
    pub fn set(&mut self, position: Point3<i32>, sample: VoxelSample) -> Result<(), VoxelFieldError> {
        let index = self
            .index_of(position)
            .ok_or(VoxelFieldError::OutOfBounds { position })?;
        self.nodes[index] = sample;
        self.available.set(index, true);
        Ok(())
    }

    /// Marks a cell as not loaded. Later reads of it fault with `Unavailable`.
    pub fn invalidate(&mut self, position: Point3<i32>) -> Result<(), VoxelFieldError> {
        let index = self
            .index_of(position)
            .ok_or(VoxelFieldError::OutOfBounds { position })?;
        self.available.set(index, false);
        Ok(())
    }

    /// Raw sample bytes, in x-then-y-then-z order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }
}

impl VoxelField for VoxelBuffer {
    fn get(&self, position: Point3<i32>) -> Result<VoxelSample, VoxelFieldError> {
        let index = self
            .index_of(position)
            .ok_or(VoxelFieldError::OutOfBounds { position })?;
        if !self.available[index] {
            return Err(VoxelFieldError::Unavailable { position });
        }
        Ok(self.nodes[index])
    }
}
