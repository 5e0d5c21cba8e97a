use loam_geom::lerp;

use crate::worldgen::WorldGenParams;

use super::biome::{BiomeAssignment, ClimateBiome, TerrainBiome};
use super::chunk_coord::ChunkCoord;
use super::gen_ctx::GenCtx;
use super::world::World;

/// Samples terrain columns for one world. Borrows a [`GenCtx`] so a worker
/// can generate many chunks without rebuilding noise state.
pub struct ColumnSampler<'a> {
    ctx: &'a GenCtx,
    world: &'a World,
    world_height: f32,
}

impl<'a> ColumnSampler<'a> {
    pub fn new(world: &'a World, ctx: &'a GenCtx) -> Self {
        Self {
            ctx,
            world,
            world_height: world.world_height(),
        }
    }

    #[inline]
    pub fn params(&self) -> &WorldGenParams {
        &self.ctx.params
    }

    /// Biome-independent surface height in world units. Base height noise is
    /// sampled at half scale, remapped to [0, max_ratio] of the world height,
    /// then perturbed by signed erosion noise. The result is clamped back
    /// into [0, max_ratio] so no modifier can push a column past the terrain
    /// ceiling.
    pub fn base_height(&self, wx: f32, wz: f32) -> f32 {
        let h = (self.ctx.height.sample2(wx * 0.5, wz * 0.5) + 1.0) * 0.5;
        let e = self.ctx.erosion.sample2(wx, wz) * self.params().erosion_amplitude;
        let ratio = (h * self.params().max_height_ratio + e)
            .clamp(0.0, self.params().max_height_ratio);
        ratio * self.world_height
    }

    #[inline]
    pub fn terrain_biome_at(&self, wx: f32, wz: f32) -> TerrainBiome {
        TerrainBiome::classify(self.ctx.biome.sample2(wx, wz))
    }

    /// Height modifier of the biome assigned to a whole chunk, sampled at
    /// its center.
    pub fn chunk_modifier(&self, coord: ChunkCoord) -> f32 {
        let (cx, cz) = self.world.chunk_center_world(coord);
        self.terrain_biome_at(cx, cz).height_modifier()
    }

    /// Surface height in world units for the column at local grid position
    /// (lx, lz) of `coord`. Valid for 0..=chunk_size so adjacent chunks share
    /// their border columns.
    ///
    /// Near a chunk edge the height blends toward the average of four
    /// neighbour estimates, resampled at +-blend_radius offsets in biome
    /// noise space. The blend factor ramps from 0 at the border to 1 one
    /// blend radius inside, taking the minimum across the four edges. At
    /// the border itself both chunks evaluate the same average, but inside
    /// the band the seam is only approximate since each side blends against
    /// its own chunk biome.
    pub fn surface_height(&self, coord: ChunkCoord, lx: usize, lz: usize) -> f32 {
        let n = self.params().chunk_size;
        debug_assert!(lx <= n && lz <= n, "column ({lx}, {lz}) outside grid");
        let voxel = self.params().voxel_size;
        let (ox, oz) = self.world.chunk_origin_world(coord);
        let wx = ox + lx as f32 * voxel;
        let wz = oz + lz as f32 * voxel;

        let base = self.base_height(wx, wz);
        let own = base * self.chunk_modifier(coord);

        let r = self.params().blend_radius as f32;
        if r <= 0.0 {
            debug_assert!(own.is_finite(), "non-finite height at ({wx}, {wz})");
            return own;
        }
        let rw = r * voxel;
        let estimates = [
            base * self.terrain_biome_at(wx + rw, wz).height_modifier(),
            base * self.terrain_biome_at(wx - rw, wz).height_modifier(),
            base * self.terrain_biome_at(wx, wz + rw).height_modifier(),
            base * self.terrain_biome_at(wx, wz - rw).height_modifier(),
        ];
        let neighbor_avg = estimates.iter().sum::<f32>() * 0.25;

        let edge_dist = (lx.min(n - lx).min(lz).min(n - lz)) as f32;
        let factor = (edge_dist / r).clamp(0.0, 1.0);

        let h = lerp(neighbor_avg, own, factor);
        debug_assert!(h.is_finite(), "non-finite height at ({wx}, {wz})");
        h
    }

    /// Whether the voxel at world position (wx, wy, wz) is carved hollow.
    /// Only the open vertical band may carve, and its bounds are exclusive
    /// so floors and ceilings stay solid.
    pub fn cave_carved(&self, wx: f32, wy: f32, wz: f32) -> bool {
        let p = self.params();
        if !p.caves_enabled {
            return false;
        }
        let y01 = wy / self.world_height;
        if y01 <= p.cave_band_min_ratio || y01 >= p.cave_band_max_ratio {
            return false;
        }
        self.ctx.cave.sample3(wx, wy, wz) > p.cave_threshold
    }

    /// Temperature and moisture at a point, both mapped into [0, 1].
    pub fn climate_sample(&self, wx: f32, wz: f32) -> (f32, f32) {
        let t = ((self.ctx.temp2d.sample2(wx, wz) + 1.0) * 0.5).clamp(0.0, 1.0);
        let m = ((self.ctx.moist2d.sample2(wx, wz) + 1.0) * 0.5).clamp(0.0, 1.0);
        (t, m)
    }

    /// Climate biome at a world position. Uses the containing chunk's height
    /// modifier without edge blending; point queries do not need seams.
    pub fn climate_at(&self, wx: f32, wz: f32) -> ClimateBiome {
        let coord = self.world.chunk_containing(wx, wz);
        let modifier = self.chunk_modifier(coord);
        let height01 = self.base_height(wx, wz) * modifier / self.world_height;
        let (t, m) = self.climate_sample(wx, wz);
        ClimateBiome::classify(t, m, height01)
    }

    /// Full biome record for a chunk, evaluated at its center column.
    pub fn assignment(&self, coord: ChunkCoord) -> BiomeAssignment {
        let (cx, cz) = self.world.chunk_center_world(coord);
        let terrain = self.terrain_biome_at(cx, cz);
        let (temperature, moisture) = self.climate_sample(cx, cz);
        let mid = self.params().chunk_size / 2;
        let height01 = self.surface_height(coord, mid, mid) / self.world_height;
        let climate = ClimateBiome::classify(temperature, moisture, height01);
        BiomeAssignment {
            terrain,
            climate,
            temperature,
            moisture,
            height01,
        }
    }
}
