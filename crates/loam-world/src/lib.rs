//! World sizing, seeded noise sampling, and worldgen parameters.
#![forbid(unsafe_code)]

pub mod voxel;
pub mod worldgen;

pub use voxel::{
    BiomeAssignment, ChunkCoord, ClimateBiome, ColumnSampler, GenCtx, NoiseField, TerrainBiome,
    World,
};
pub use worldgen::{
    ConfigError, WorldGenConfig, WorldGenParams, load_params_from_path,
    load_worldgen_config_from_path,
};
