//! # Voxel Mesher Entry Point
//!
//! Meshes a generated map and logs a summary. Set `VOXEL_MESHER_CONFIG` to a JSON
//! configuration file and `RUST_LOG` to control the output.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    voxel_mesher::run();
}
