mod biome;
mod chunk_coord;
mod gen_ctx;
mod generation;
mod noise;
mod world;

pub use biome::{BiomeAssignment, ClimateBiome, TerrainBiome};
pub use chunk_coord::ChunkCoord;
pub use gen_ctx::GenCtx;
pub use generation::ColumnSampler;
pub use noise::NoiseField;
pub use world::World;
