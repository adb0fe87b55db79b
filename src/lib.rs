#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesher
//!
//! Converts blocks of voxels into renderable quad meshes.
//!
//! A block is swept along rows; consecutive voxel pairs that look the same are
//! merged into a single stretched quad, faces between two opaque cubes are culled,
//! and every quad is shaded by the light of the voxel it faces and its direction.
//!
//! ## Key Modules
//!
//! * `voxels` - Voxel samples, node types, blocks and the block map
//! * `meshing` - Face culling, row merging and the `BlockMeshMaker`
//! * `task_management` - Worker pool used to mesh blocks in the background
//! * `config` - Runtime settings
//! * `core` - Shared-state wrappers
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use cgmath::Point3;
//! use voxel_mesher::meshing::BlockMeshMaker;
//! use voxel_mesher::voxels::{BlockMap, GenerationMethod, NodeTypeRegistry};
//!
//! let mut map = BlockMap::new(8, GenerationMethod::Checkerboard, 0);
//! for x in 0..=1 {
//!     for y in 0..=1 {
//!         for z in 0..=1 {
//!             map.add_block_at(Point3::new(x, y, z));
//!         }
//!     }
//! }
//!
//! let maker = BlockMeshMaker::new(Arc::new(NodeTypeRegistry::default()), 8);
//! let mesh = maker.make_mesh(Point3::new(0, 0, 0), &map).unwrap();
//! assert!(mesh.face_count() > 0);
//! ```

use std::sync::Arc;

use cgmath::Point3;
use log::info;
use web_time::Instant;

use crate::{
    config::{ConfigError, MesherConfig},
    core::MtResource,
    meshing::{
        block_mesh_map::BlockMeshMap,
        mesh::BlockMeshMaker,
        tasks::{BlockMeshTask, MeshingStats},
    },
    task_management::TaskManager,
    voxels::{block_map::BlockMap, node::NodeTypeRegistry},
};

pub mod config;
pub mod core;
pub mod meshing;
pub mod task_management;
pub mod voxels;

/// Stopwatch label for map generation.
pub const MAP_GENERATION_STOPWATCH: &str = "Map Generation";
/// Stopwatch label for meshing.
pub const MESHING_STOPWATCH: &str = "Meshing";

/// Summary of a meshing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshingReport {
    /// Blocks generated, halo included.
    pub blocks_generated: usize,
    /// Blocks a meshing task was published for.
    pub blocks_requested: usize,
    /// Outcome counters of the meshing tasks.
    pub stats: MeshingStats,
    /// Meshes held by the mesh map at the end of the run.
    pub meshes_stored: usize,
    /// Quads across all stored meshes.
    pub total_faces: usize,
}

/// Initializes logging, loads the configuration named by `VOXEL_MESHER_CONFIG` and
/// meshes the map it describes.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let result = MesherConfig::from_env().and_then(run_with_config);
    match result {
        Ok(report) => info!("{:?}", report),
        Err(err) => log::error!("Meshing run failed: {}", err),
    }
}

/// Generates a map around the origin and meshes every block within
/// `config.map_radius` on a worker pool.
///
/// Blocks one step further out are generated too, so every meshed block has its
/// positive-side neighbours loaded.
pub fn run_with_config(config: MesherConfig) -> Result<MeshingReport, ConfigError> {
    config.validate()?;

    let registry = match &config.node_registry {
        Some(path) => NodeTypeRegistry::load(path)?,
        None => NodeTypeRegistry::default(),
    };
    let maker = Arc::new(BlockMeshMaker::new(Arc::new(registry), config.block_size));

    let stopwatch = Instant::now();
    let mut map = BlockMap::new(config.block_size, config.generation_method, config.seed);
    let generated = cube_positions(config.map_radius + 1);
    for &position in &generated {
        map.add_block_at(position);
    }
    info!(
        "{}: {} blocks in {:?}",
        MAP_GENERATION_STOPWATCH,
        generated.len(),
        stopwatch.elapsed()
    );

    let block_map = MtResource::new(map);
    let mesh_map = MtResource::new(BlockMeshMap::new(config.mesh_cache_capacity));
    let stats = MtResource::new(MeshingStats::default());

    let stopwatch = Instant::now();
    let mut task_manager = TaskManager::new(config.worker_count);
    let requested = cube_positions(config.map_radius);
    for &position in &requested {
        task_manager.publish_task(Box::new(BlockMeshTask::new(
            maker.clone(),
            block_map.clone(),
            mesh_map.clone(),
            stats.clone(),
            position,
            config.max_mesh_attempts,
        )));
    }
    task_manager.run_until_idle();
    info!(
        "{}: {} blocks in {:?}",
        MESHING_STOPWATCH,
        requested.len(),
        stopwatch.elapsed()
    );

    let stats = *stats.get();
    let (meshes_stored, total_faces) = {
        let mesh_map = mesh_map.get();
        (mesh_map.len(), mesh_map.total_faces())
    };
    Ok(MeshingReport {
        blocks_generated: generated.len(),
        blocks_requested: requested.len(),
        stats,
        meshes_stored,
        total_faces,
    })
}

/// Block positions with every coordinate in `-radius..=radius`.
fn cube_positions(radius: i32) -> Vec<Point3<i32>> {
    let mut positions = Vec::new();
    for x in -radius..=radius {
        for y in -radius..=radius {
            for z in -radius..=radius {
                positions.push(Point3::new(x, y, z));
            }
        }
    }
    positions
}
