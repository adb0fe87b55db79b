//! # Configuration
//!
//! Runtime settings for a meshing run, read from a JSON file. Every field has a
//! default, so an empty object (or no file at all) is a valid configuration:
//!
//! ```json
//! {
//!     "block_size": 16,
//!     "map_radius": 2,
//!     "generation_method": "perlin",
//!     "seed": 0,
//!     "worker_count": 8,
//!     "max_mesh_attempts": 3,
//!     "mesh_cache_capacity": 10000,
//!     "node_registry": "nodes.json"
//! }
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
    thread,
};

use serde::{Deserialize, Serialize};

use crate::{
    meshing::block_mesh_map::DEFAULT_MESH_CACHE_CAPACITY,
    voxels::{
        block::{GenerationMethod, MAX_BLOCK_SIZE},
        node::node_properties::RegistryError,
    },
};

/// Largest accepted `map_radius`, in blocks.
pub const MAX_MAP_RADIUS: i32 = 64;

/// Environment variable holding the path of the configuration file.
pub const CONFIG_PATH_ENV: &str = "VOXEL_MESHER_CONFIG";

/// Errors raised while loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path of the configuration file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON or has mistyped fields.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value outside its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// The node registry named by the configuration could not be loaded.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Settings of a meshing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MesherConfig {
    /// Edge length of a block, in nodes.
    pub block_size: i32,
    /// Blocks within this Chebyshev distance of the origin are meshed.
    pub map_radius: i32,
    /// How new blocks are filled.
    pub generation_method: GenerationMethod,
    /// Seed for the generators.
    pub seed: u32,
    /// Number of meshing worker threads.
    pub worker_count: usize,
    /// How many times a block whose voxel lookups fault is tried.
    pub max_mesh_attempts: u32,
    /// Maximum number of meshes kept in memory.
    pub mesh_cache_capacity: usize,
    /// Node registry file. The built-in registry is used when absent.
    pub node_registry: Option<PathBuf>,
}

impl Default for MesherConfig {
    fn default() -> Self {
        MesherConfig {
            block_size: 16,
            map_radius: 2,
            generation_method: GenerationMethod::Perlin,
            seed: 0,
            worker_count: thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            max_mesh_attempts: 3,
            mesh_cache_capacity: DEFAULT_MESH_CACHE_CAPACITY,
            node_registry: None,
        }
    }
}

impl MesherConfig {
    /// Parses and validates a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MesherConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`.
    ///
    /// A relative `node_registry` path is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_json(&json)?;

        if let (Some(registry), Some(dir)) = (&config.node_registry, path.parent()) {
            if registry.is_relative() {
                config.node_registry = Some(dir.join(registry));
            }
        }
        Ok(config)
    }

    /// Loads the file named by `VOXEL_MESHER_CONFIG`, or returns the defaults when the
    /// variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Checks that every field is within its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_BLOCK_SIZE).contains(&self.block_size) {
            return Err(ConfigError::Invalid(format!(
                "block_size must be in 1..={}, got {}",
                MAX_BLOCK_SIZE, self.block_size
            )));
        }
        if !(0..=MAX_MAP_RADIUS).contains(&self.map_radius) {
            return Err(ConfigError::Invalid(format!(
                "map_radius must be in 0..={}, got {}",
                MAX_MAP_RADIUS, self.map_radius
            )));
        }
        if self.max_mesh_attempts < 1 {
            return Err(ConfigError::Invalid(
                "max_mesh_attempts must be at least 1".to_string(),
            ));
        }
        if self.mesh_cache_capacity < 1 {
            return Err(ConfigError::Invalid(
                "mesh_cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
