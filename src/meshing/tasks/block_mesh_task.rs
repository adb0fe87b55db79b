//! Task for meshing one block in a background thread.
//!
//! The task copies the block and its halo out of the shared `BlockMap`, releases
//! the lock, and runs the mesher on the private copy. Its result is applied to the
//! `BlockMeshMap` on the thread driving the `TaskManager`.

use std::sync::Arc;

use cgmath::Point3;
use log::{error, trace, warn};

use crate::{
    core::MtResource,
    meshing::{block_mesh_map::BlockMeshMap, mesh::BlockMeshMaker, mesh::Mesh},
    task_management::task::{Task, TaskResult},
    voxels::{block_map::BlockMap, voxel_field::VoxelFieldError},
};

/// Running totals of meshing outcomes, shared by every task of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshingStats {
    /// Blocks that produced a mesh.
    pub meshed: usize,
    /// Blocks without any visible face.
    pub empty: usize,
    /// Attempts that hit a voxel lookup fault and were retried.
    pub retried: usize,
    /// Blocks given up on after the last attempt faulted.
    pub failed: usize,
}

/// A task that builds the mesh of one block.
pub struct BlockMeshTask {
    /// Shared mesher configuration
    maker: Arc<BlockMeshMaker>,
    /// The voxel store the block is read from
    block_map: MtResource<BlockMap>,
    /// Where the finished mesh goes
    mesh_map: MtResource<BlockMeshMap>,
    /// Outcome counters
    stats: MtResource<MeshingStats>,
    /// Block to mesh
    position: Point3<i32>,
    /// 1-based number of this attempt
    attempt: u32,
    /// Attempts allowed before giving up
    max_attempts: u32,
}

impl BlockMeshTask {
    /// Creates the first attempt at meshing the block at `position`.
    ///
    /// # Arguments
    /// * `maker` - The mesher, shared between tasks
    /// * `block_map` - The block map to snapshot
    /// * `mesh_map` - Receives the mesh, or loses the stale one if the block is empty
    /// * `stats` - Counters updated when the result is handled
    /// * `position` - Block position to mesh
    /// * `max_attempts` - How many times a faulting block is tried; zero means once
    pub fn new(
        maker: Arc<BlockMeshMaker>,
        block_map: MtResource<BlockMap>,
        mesh_map: MtResource<BlockMeshMap>,
        stats: MtResource<MeshingStats>,
        position: Point3<i32>,
        max_attempts: u32,
    ) -> Self {
        BlockMeshTask {
            maker,
            block_map,
            mesh_map,
            stats,
            position,
            attempt: 1,
            max_attempts: max_attempts.max(1),
        }
    }

    fn retry(&self) -> Self {
        BlockMeshTask {
            maker: self.maker.clone(),
            block_map: self.block_map.clone(),
            mesh_map: self.mesh_map.clone(),
            stats: self.stats.clone(),
            position: self.position,
            attempt: self.attempt + 1,
            max_attempts: self.max_attempts,
        }
    }
}

impl Task for BlockMeshTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let snapshot = self.block_map.get().copy_to_buffer(self.position);
        let outcome = self.maker.try_make_mesh(self.position, &snapshot);

        Box::new(BlockMeshTaskResult {
            task: self.retry(),
            outcome,
        })
    }
}

/// The outcome of a `BlockMeshTask`.
pub struct BlockMeshTaskResult {
    /// The follow-up attempt, published only if this one faulted
    task: BlockMeshTask,
    outcome: Result<Option<Mesh>, VoxelFieldError>,
}

impl TaskResult for BlockMeshTaskResult {
    /// Stores or clears the block's mesh; on a lookup fault schedules another
    /// attempt until the limit is reached.
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task + Send>> {
        let BlockMeshTaskResult { task, outcome } = *self;
        let position = task.position;
        let attempt = task.attempt - 1;

        match outcome {
            Ok(Some(mesh)) => {
                trace!("Storing mesh of block {:?} ({} faces)", position, mesh.face_count());
                task.mesh_map.get_mut().insert(position, mesh);
                task.stats.get_mut().meshed += 1;
                Vec::new()
            }
            Ok(None) => {
                task.mesh_map.get_mut().remove(position);
                task.stats.get_mut().empty += 1;
                Vec::new()
            }
            Err(err) if attempt < task.max_attempts => {
                warn!(
                    "Meshing block {:?} failed on attempt {}/{}: {}",
                    position, attempt, task.max_attempts, err
                );
                task.stats.get_mut().retried += 1;
                vec![Box::new(task)]
            }
            Err(err) => {
                error!(
                    "Giving up on block {:?} after {} attempts: {}",
                    position, attempt, err
                );
                task.mesh_map.get_mut().remove(position);
                task.stats.get_mut().failed += 1;
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        task_management::TaskManager,
        voxels::{
            block::{Block, GenerationMethod},
            node::{NodeType, NodeTypeRegistry, VoxelSample},
        },
    };

    const SIZE: i32 = 4;

    struct Fixture {
        maker: Arc<BlockMeshMaker>,
        block_map: MtResource<BlockMap>,
        mesh_map: MtResource<BlockMeshMap>,
        stats: MtResource<MeshingStats>,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                maker: Arc::new(BlockMeshMaker::new(Arc::new(NodeTypeRegistry::default()), SIZE)),
                block_map: MtResource::new(BlockMap::new(SIZE, GenerationMethod::Empty, 0)),
                mesh_map: MtResource::new(BlockMeshMap::new(16)),
                stats: MtResource::new(MeshingStats::default()),
            }
        }

        fn task(&self, position: Point3<i32>, max_attempts: u32) -> Box<BlockMeshTask> {
            Box::new(BlockMeshTask::new(
                self.maker.clone(),
                self.block_map.clone(),
                self.mesh_map.clone(),
                self.stats.clone(),
                position,
                max_attempts,
            ))
        }

        fn load_halo(&self, position: Point3<i32>) {
            let mut map = self.block_map.get_mut();
            for dz in 0..=1 {
                for dy in 0..=1 {
                    for dx in 0..=1 {
                        map.add_block_at(position + cgmath::Vector3::new(dx, dy, dz));
                    }
                }
            }
        }
    }

    #[test]
    fn meshed_block_lands_in_the_mesh_map() {
        let fixture = Fixture::new();
        let origin = Point3::new(0, 0, 0);
        fixture.load_halo(origin);
        fixture
            .block_map
            .get_mut()
            .set_node(Point3::new(1, 1, 1), VoxelSample::solid(NodeType::GRASS))
            .unwrap();

        let mut task_manager = TaskManager::new(2);
        task_manager.publish_task(fixture.task(origin, 3));
        task_manager.run_until_idle();

        assert_eq!(fixture.mesh_map.get_mut().get(origin).map(Mesh::face_count), Some(6));
        assert_eq!(
            *fixture.stats.get(),
            MeshingStats { meshed: 1, ..Default::default() }
        );
    }

    #[test]
    fn empty_block_clears_a_stale_mesh() {
        let fixture = Fixture::new();
        let origin = Point3::new(0, 0, 0);
        fixture.load_halo(origin);
        fixture.mesh_map.get_mut().insert(
            origin,
            Mesh {
                positions: vec![0.0; 12],
                colors: vec![0; 12],
            },
        );

        let mut task_manager = TaskManager::new(1);
        task_manager.publish_task(fixture.task(origin, 3));
        task_manager.run_until_idle();

        assert!(fixture.mesh_map.get().is_empty());
        assert_eq!(fixture.stats.get().empty, 1);
    }

    #[test]
    fn missing_halo_is_retried_then_given_up() {
        let fixture = Fixture::new();
        let origin = Point3::new(0, 0, 0);
        assert!(fixture
            .block_map
            .get_mut()
            .insert_block(Block::solid(origin, SIZE))
            .is_ok());

        let mut task_manager = TaskManager::new(1);
        task_manager.publish_task(fixture.task(origin, 3));
        task_manager.run_until_idle();

        let stats = *fixture.stats.get();
        assert_eq!(stats.retried, 2);
        assert_eq!(stats.failed, 1);
        assert!(!fixture.mesh_map.get().contains(origin));
    }
}
