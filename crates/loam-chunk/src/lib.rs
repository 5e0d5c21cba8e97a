//! Chunk buffers and terrain generation helpers.
#![forbid(unsafe_code)]

use loam_geom::lerp;
use loam_world::{BiomeAssignment, ChunkCoord, ColumnSampler, GenCtx, World};

/// Generated voxel data for one chunk: a surface heightfield over an
/// (n+1) x (n+1) column grid, a signed density grid of (n+1)^3 samples,
/// and a binary occupancy grid over the interior n^3 voxels. The extra
/// row/plane per axis of the sample grids carries the shared border with
/// the next chunk so neighbours agree without re-sampling.
#[derive(Clone, Debug)]
pub struct ChunkBuf {
    pub coord: ChunkCoord,
    /// Cells per axis; sample grids are (n + 1) wide.
    pub n: usize,
    pub voxel_size: f32,
    pub heights: Vec<f32>,
    pub density: Vec<f32>,
    /// One flag per interior voxel, true where the density sample at the
    /// voxel's minimum corner is solid.
    pub occupied: Vec<bool>,
}

impl ChunkBuf {
    /// Samples per axis of the grids.
    #[inline]
    pub fn dim(&self) -> usize {
        self.n + 1
    }

    #[inline]
    pub fn hidx(&self, lx: usize, lz: usize) -> usize {
        lz * self.dim() + lx
    }

    #[inline]
    pub fn didx(&self, lx: usize, ly: usize, lz: usize) -> usize {
        (ly * self.dim() + lz) * self.dim() + lx
    }

    #[inline]
    pub fn height_at(&self, lx: usize, lz: usize) -> f32 {
        self.heights[self.hidx(lx, lz)]
    }

    #[inline]
    pub fn density_at(&self, lx: usize, ly: usize, lz: usize) -> f32 {
        self.density[self.didx(lx, ly, lz)]
    }

    /// A sample is solid when its density is strictly positive. Carved
    /// samples carry a negative sentinel and read as open.
    #[inline]
    pub fn is_solid(&self, lx: usize, ly: usize, lz: usize) -> bool {
        self.density_at(lx, ly, lz) > 0.0
    }

    /// Index into the n^3 occupancy grid. All coordinates must be < n.
    #[inline]
    pub fn oidx(&self, lx: usize, ly: usize, lz: usize) -> usize {
        (ly * self.n + lz) * self.n + lx
    }

    #[inline]
    pub fn voxel_occupied(&self, lx: usize, ly: usize, lz: usize) -> bool {
        self.occupied[self.oidx(lx, ly, lz)]
    }

    /// World-space edge length of this chunk.
    #[inline]
    pub fn world_size(&self) -> f32 {
        self.n as f32 * self.voxel_size
    }

    /// Minimum (x, z) corner in world space.
    #[inline]
    pub fn origin_world(&self) -> (f32, f32) {
        let s = self.world_size();
        (self.coord.cx as f32 * s, self.coord.cz as f32 * s)
    }

    #[inline]
    pub fn contains_world(&self, wx: f32, wz: f32) -> bool {
        let (ox, oz) = self.origin_world();
        let s = self.world_size();
        wx >= ox && wx <= ox + s && wz >= oz && wz <= oz + s
    }

    /// Bilinearly interpolated surface height at a world position inside
    /// this chunk's footprint. `None` when the position is outside.
    pub fn height_at_world(&self, wx: f32, wz: f32) -> Option<f32> {
        if !self.contains_world(wx, wz) {
            return None;
        }
        let (ox, oz) = self.origin_world();
        let fx = ((wx - ox) / self.voxel_size).clamp(0.0, self.n as f32);
        let fz = ((wz - oz) / self.voxel_size).clamp(0.0, self.n as f32);
        let x0 = (fx.floor() as usize).min(self.n - 1);
        let z0 = (fz.floor() as usize).min(self.n - 1);
        let tx = fx - x0 as f32;
        let tz = fz - z0 as f32;
        let h00 = self.height_at(x0, z0);
        let h10 = self.height_at(x0 + 1, z0);
        let h01 = self.height_at(x0, z0 + 1);
        let h11 = self.height_at(x0 + 1, z0 + 1);
        Some(lerp(lerp(h00, h10, tx), lerp(h01, h11, tx), tz))
    }

    #[inline]
    pub fn has_solid(&self) -> bool {
        self.density.iter().any(|d| *d > 0.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkOccupancy {
    Empty,
    Populated,
}

impl ChunkOccupancy {
    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, ChunkOccupancy::Empty)
    }

    #[inline]
    pub fn has_terrain(self) -> bool {
        matches!(self, ChunkOccupancy::Populated)
    }
}

#[derive(Clone, Debug)]
pub struct ChunkGenerateResult {
    pub buf: ChunkBuf,
    pub occupancy: ChunkOccupancy,
    pub assignment: BiomeAssignment,
}

/// Generates a chunk with a context built on the spot. Workers that churn
/// through many chunks should build one [`GenCtx`] and use
/// [`generate_chunk_buffer_with`] instead.
pub fn generate_chunk_buffer(world: &World, coord: ChunkCoord) -> ChunkGenerateResult {
    let ctx = world.make_gen_ctx();
    generate_chunk_buffer_with(world, &ctx, coord)
}

pub fn generate_chunk_buffer_with(
    world: &World,
    ctx: &GenCtx,
    coord: ChunkCoord,
) -> ChunkGenerateResult {
    let n = world.chunk_size();
    let dim = n + 1;
    let voxel = world.voxel_size();
    let sampler = ColumnSampler::new(world, ctx);
    let (ox, oz) = world.chunk_origin_world(coord);

    let mut heights = vec![0.0f32; dim * dim];
    for lz in 0..dim {
        for lx in 0..dim {
            heights[lz * dim + lx] = sampler.surface_height(coord, lx, lz);
        }
    }

    let hollow = world.params().hollow_density;
    let mut density = vec![0.0f32; dim * dim * dim];
    let mut occupied = vec![false; n * n * n];
    let mut has_solid = false;
    for ly in 0..dim {
        let wy = ly as f32 * voxel;
        for lz in 0..dim {
            let wz = oz + lz as f32 * voxel;
            for lx in 0..dim {
                let wx = ox + lx as f32 * voxel;
                let mut d = heights[lz * dim + lx] - wy;
                if d > 0.0 && sampler.cave_carved(wx, wy, wz) {
                    d = hollow;
                }
                if d > 0.0 {
                    has_solid = true;
                    if lx < n && ly < n && lz < n {
                        occupied[(ly * n + lz) * n + lx] = true;
                    }
                }
                density[(ly * dim + lz) * dim + lx] = d;
            }
        }
    }

    let assignment = sampler.assignment(coord);
    ChunkGenerateResult {
        buf: ChunkBuf {
            coord,
            n,
            voxel_size: voxel,
            heights,
            density,
            occupied,
        },
        occupancy: if has_solid {
            ChunkOccupancy::Populated
        } else {
            ChunkOccupancy::Empty
        },
        assignment,
    }
}
