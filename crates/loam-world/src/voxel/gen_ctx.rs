use std::sync::Arc;

use crate::worldgen::WorldGenParams;

use super::noise::NoiseField;

/// Per-worker bundle of noise fields. Built once via [`super::World::make_gen_ctx`]
/// and reused across chunk jobs; sampling is `&self` so one context can serve
/// a whole job without locking.
pub struct GenCtx {
    pub height: NoiseField,
    pub erosion: NoiseField,
    pub biome: NoiseField,
    pub cave: NoiseField,
    pub temp2d: NoiseField,
    pub moist2d: NoiseField,
    pub params: Arc<WorldGenParams>,
}
