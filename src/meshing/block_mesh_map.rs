//! Storage for finished block meshes.
//!
//! Meshes are kept in an LRU cache keyed by block position. When the cache is full,
//! the least recently stored or read mesh is evicted; it can always be rebuilt from
//! the block map.

use std::num::NonZeroUsize;

use cgmath::Point3;
use log::trace;
use lru::LruCache;

use super::mesh::Mesh;

/// Default number of meshes kept before eviction starts.
pub const DEFAULT_MESH_CACHE_CAPACITY: usize = 10000;

/// LRU map from block position to the mesh of that block.
pub struct BlockMeshMap {
    meshes: LruCache<Point3<i32>, Mesh>,
}

impl BlockMeshMap {
    /// Creates a map that holds at most `capacity` meshes. A capacity of zero is
    /// treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        BlockMeshMap {
            meshes: LruCache::new(capacity),
        }
    }

    /// Stores the mesh of a block, replacing any previous one.
    ///
    /// # Returns
    /// The position of a block whose mesh was evicted to make room, if any.
    pub fn insert(&mut self, position: Point3<i32>, mesh: Mesh) -> Option<Point3<i32>> {
        match self.meshes.push(position, mesh) {
            Some((evicted, _)) if evicted != position => {
                trace!("Evicted mesh of block {:?}", evicted);
                Some(evicted)
            }
            _ => None,
        }
    }

    /// Forgets the mesh of a block, e.g. because it no longer has visible faces.
    pub fn remove(&mut self, position: Point3<i32>) -> Option<Mesh> {
        self.meshes.pop(&position)
    }

    /// Returns the mesh of a block and marks it as recently used.
    pub fn get(&mut self, position: Point3<i32>) -> Option<&Mesh> {
        self.meshes.get(&position)
    }

    /// Whether a mesh is stored for the block. Does not touch the LRU order.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.meshes.contains(&position)
    }

    /// Number of stored meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether no mesh is stored.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Sum of the face counts of every stored mesh.
    pub fn total_faces(&self) -> usize {
        self.meshes.iter().map(|(_, mesh)| mesh.face_count()).sum()
    }
}

impl Default for BlockMeshMap {
    fn default() -> Self {
        BlockMeshMap::new(DEFAULT_MESH_CACHE_CAPACITY)
    }
}
