use std::sync::Arc;

use crate::worldgen::{ConfigError, WorldGenConfig, WorldGenParams};

use super::chunk_coord::ChunkCoord;
use super::gen_ctx::GenCtx;
use super::noise::NoiseField;

/// Immutable description of one seeded world. Cheap to clone and share;
/// workers derive their own [`GenCtx`] from it.
#[derive(Clone)]
pub struct World {
    pub seed: i32,
    params: Arc<WorldGenParams>,
}

impl World {
    pub fn new(seed: i32, config: &WorldGenConfig) -> Result<Self, ConfigError> {
        let params = WorldGenParams::from_config(config)?;
        Ok(Self::from_params(seed, params))
    }

    pub fn from_params(seed: i32, params: WorldGenParams) -> Self {
        Self {
            seed,
            params: Arc::new(params),
        }
    }

    #[inline]
    pub fn params(&self) -> &WorldGenParams {
        &self.params
    }

    #[inline]
    pub fn params_arc(&self) -> Arc<WorldGenParams> {
        Arc::clone(&self.params)
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.params.chunk_size
    }

    #[inline]
    pub fn voxel_size(&self) -> f32 {
        self.params.voxel_size
    }

    /// World-space edge length of one chunk.
    #[inline]
    pub fn chunk_world_size(&self) -> f32 {
        self.params.chunk_world_size()
    }

    /// Vertical extent of the world. The grid is one chunk tall.
    #[inline]
    pub fn world_height(&self) -> f32 {
        self.chunk_world_size()
    }

    /// Tallest surface any biome can produce.
    #[inline]
    pub fn max_terrain_height(&self) -> f32 {
        self.world_height() * self.params.max_height_ratio
    }

    /// Minimum (x, z) corner of a chunk in world space.
    #[inline]
    pub fn chunk_origin_world(&self, coord: ChunkCoord) -> (f32, f32) {
        let s = self.chunk_world_size();
        (coord.cx as f32 * s, coord.cz as f32 * s)
    }

    /// World-space (x, z) center of a chunk.
    #[inline]
    pub fn chunk_center_world(&self, coord: ChunkCoord) -> (f32, f32) {
        let s = self.chunk_world_size();
        ((coord.cx as f32 + 0.5) * s, (coord.cz as f32 + 0.5) * s)
    }

    /// Chunk whose footprint contains the point.
    #[inline]
    pub fn chunk_containing(&self, x: f32, z: f32) -> ChunkCoord {
        let s = self.chunk_world_size();
        ChunkCoord::new((x / s).floor() as i32, (z / s).floor() as i32)
    }

    /// Chunk nearest the point, used as the streaming anchor. Rounding (not
    /// flooring) keeps the desired set centered on the viewer.
    #[inline]
    pub fn anchor_chunk(&self, x: f32, z: f32) -> ChunkCoord {
        let s = self.chunk_world_size();
        ChunkCoord::new((x / s).round() as i32, (z / s).round() as i32)
    }

    /// Builds the per-worker noise bundle. Each field gets its own salted
    /// seed so the layers decorrelate while staying reproducible.
    pub fn make_gen_ctx(&self) -> GenCtx {
        let p = &self.params;
        GenCtx {
            height: NoiseField::new(self.seed, p.height_frequency, p.height_octaves),
            erosion: NoiseField::new(self.seed ^ 99_173, p.erosion_frequency, p.erosion_octaves),
            biome: NoiseField::new(self.seed ^ 77_251, p.biome_frequency, 2),
            cave: NoiseField::new(self.seed ^ 41_337, p.cave_frequency, 3),
            temp2d: NoiseField::new(self.seed ^ 0x1203_5F31, p.temperature_frequency, 1),
            moist2d: NoiseField::new(
                ((self.seed as u32) ^ 0x92E3_A1B2u32) as i32,
                p.moisture_frequency,
                1,
            ),
            params: Arc::clone(&self.params),
        }
    }
}
