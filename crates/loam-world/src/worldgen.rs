use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub chunk: Chunk,
    #[serde(default)]
    pub height: Height,
    #[serde(default)]
    pub erosion: Erosion,
    #[serde(default)]
    pub biome: Biome,
    #[serde(default)]
    pub caves: Caves,
    #[serde(default)]
    pub climate: Climate,
    #[serde(default)]
    pub blend: Blend,
    #[serde(default)]
    pub stream: Stream,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            chunk: Chunk::default(),
            height: Height::default(),
            erosion: Erosion::default(),
            biome: Biome::default(),
            caves: Caves::default(),
            climate: Climate::default(),
            blend: Blend::default(),
            stream: Stream::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chunk {
    #[serde(default = "default_chunk_size")]
    pub size: usize,
    #[serde(default = "default_voxel_size")]
    pub voxel_size: f32,
}
fn default_chunk_size() -> usize {
    32
}
fn default_voxel_size() -> f32 {
    1.0
}
impl Default for Chunk {
    fn default() -> Self {
        Self {
            size: default_chunk_size(),
            voxel_size: default_voxel_size(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Height {
    #[serde(default = "default_height_freq")]
    pub frequency: f32,
    #[serde(default = "default_height_octaves")]
    pub octaves: u32,
    #[serde(default = "default_max_height_ratio")]
    pub max_ratio: f32,
}
fn default_height_freq() -> f32 {
    0.012
}
fn default_height_octaves() -> u32 {
    4
}
fn default_max_height_ratio() -> f32 {
    0.8
}
impl Default for Height {
    fn default() -> Self {
        Self {
            frequency: default_height_freq(),
            octaves: default_height_octaves(),
            max_ratio: default_max_height_ratio(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Erosion {
    #[serde(default = "default_erosion_freq")]
    pub frequency: f32,
    #[serde(default = "default_erosion_octaves")]
    pub octaves: u32,
    #[serde(default = "default_erosion_amplitude")]
    pub amplitude: f32,
}
fn default_erosion_freq() -> f32 {
    0.045
}
fn default_erosion_octaves() -> u32 {
    2
}
fn default_erosion_amplitude() -> f32 {
    0.15
}
impl Default for Erosion {
    fn default() -> Self {
        Self {
            frequency: default_erosion_freq(),
            octaves: default_erosion_octaves(),
            amplitude: default_erosion_amplitude(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Biome {
    #[serde(default = "default_biome_freq")]
    pub frequency: f32,
}
fn default_biome_freq() -> f32 {
    0.004
}
impl Default for Biome {
    fn default() -> Self {
        Self {
            frequency: default_biome_freq(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Caves {
    #[serde(default = "default_caves_enable")]
    pub enable: bool,
    #[serde(default = "default_caves_freq")]
    pub frequency: f32,
    #[serde(default = "default_caves_threshold")]
    pub threshold: f32,
    #[serde(default = "default_cave_band_min_ratio")]
    pub band_min_ratio: f32,
    #[serde(default = "default_cave_band_max_ratio")]
    pub band_max_ratio: f32,
    #[serde(default = "default_hollow_density")]
    pub hollow_density: f32,
}
fn default_caves_enable() -> bool {
    true
}
fn default_caves_freq() -> f32 {
    0.08
}
fn default_caves_threshold() -> f32 {
    0.55
}
fn default_cave_band_min_ratio() -> f32 {
    0.2
}
fn default_cave_band_max_ratio() -> f32 {
    0.8
}
fn default_hollow_density() -> f32 {
    -1.0
}
impl Default for Caves {
    fn default() -> Self {
        Self {
            enable: default_caves_enable(),
            frequency: default_caves_freq(),
            threshold: default_caves_threshold(),
            band_min_ratio: default_cave_band_min_ratio(),
            band_max_ratio: default_cave_band_max_ratio(),
            hollow_density: default_hollow_density(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Climate {
    #[serde(default = "default_temperature_freq")]
    pub temperature_frequency: f32,
    #[serde(default = "default_moisture_freq")]
    pub moisture_frequency: f32,
}
fn default_temperature_freq() -> f32 {
    0.003
}
fn default_moisture_freq() -> f32 {
    0.005
}
impl Default for Climate {
    fn default() -> Self {
        Self {
            temperature_frequency: default_temperature_freq(),
            moisture_frequency: default_moisture_freq(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Blend {
    #[serde(default = "default_blend_radius")]
    pub radius: usize,
}
fn default_blend_radius() -> usize {
    4
}
impl Default for Blend {
    fn default() -> Self {
        Self {
            radius: default_blend_radius(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Stream {
    /// View radius in chunk units; the desired set is a Euclidean disc.
    #[serde(default = "default_view_distance")]
    pub view_distance: f32,
    /// Viewer movement in world units below which no restream happens.
    #[serde(default = "default_movement_threshold")]
    pub movement_threshold: f32,
}
fn default_view_distance() -> f32 {
    3.0
}
fn default_movement_threshold() -> f32 {
    8.0
}
impl Default for Stream {
    fn default() -> Self {
        Self {
            view_distance: default_view_distance(),
            movement_threshold: default_movement_threshold(),
        }
    }
}

/// Flattened, validated parameters handed to the generation pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldGenParams {
    pub chunk_size: usize,
    pub voxel_size: f32,
    pub height_frequency: f32,
    pub height_octaves: u32,
    pub max_height_ratio: f32,
    pub erosion_frequency: f32,
    pub erosion_octaves: u32,
    pub erosion_amplitude: f32,
    pub biome_frequency: f32,
    pub caves_enabled: bool,
    pub cave_frequency: f32,
    pub cave_threshold: f32,
    pub cave_band_min_ratio: f32,
    pub cave_band_max_ratio: f32,
    pub hollow_density: f32,
    pub temperature_frequency: f32,
    pub moisture_frequency: f32,
    pub blend_radius: usize,
    pub view_distance: f32,
    pub movement_threshold: f32,
}

impl Default for WorldGenParams {
    fn default() -> Self {
        Self::from_config(&WorldGenConfig::default())
            .expect("default worldgen config must validate")
    }
}

impl WorldGenParams {
    pub fn from_config(cfg: &WorldGenConfig) -> Result<Self, ConfigError> {
        if cfg.chunk.size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if !(cfg.chunk.voxel_size > 0.0) || !cfg.chunk.voxel_size.is_finite() {
            return Err(ConfigError::NonPositiveVoxelSize(cfg.chunk.voxel_size));
        }
        if cfg.blend.radius >= cfg.chunk.size {
            return Err(ConfigError::BlendRadiusTooLarge {
                radius: cfg.blend.radius,
                chunk_size: cfg.chunk.size,
            });
        }
        if !(cfg.height.max_ratio > 0.0 && cfg.height.max_ratio <= 1.0) {
            return Err(ConfigError::BadHeightRatio(cfg.height.max_ratio));
        }
        if !(cfg.caves.band_min_ratio >= 0.0
            && cfg.caves.band_max_ratio <= 1.0
            && cfg.caves.band_min_ratio < cfg.caves.band_max_ratio)
        {
            return Err(ConfigError::BadCaveBand {
                min: cfg.caves.band_min_ratio,
                max: cfg.caves.band_max_ratio,
            });
        }
        if !(cfg.stream.view_distance > 0.0) || !cfg.stream.view_distance.is_finite() {
            return Err(ConfigError::NonPositiveViewDistance(
                cfg.stream.view_distance,
            ));
        }
        if cfg.stream.movement_threshold < 0.0 || !cfg.stream.movement_threshold.is_finite() {
            return Err(ConfigError::NegativeMovementThreshold(
                cfg.stream.movement_threshold,
            ));
        }
        Ok(Self {
            chunk_size: cfg.chunk.size,
            voxel_size: cfg.chunk.voxel_size,
            height_frequency: cfg.height.frequency,
            height_octaves: cfg.height.octaves.max(1),
            max_height_ratio: cfg.height.max_ratio,
            erosion_frequency: cfg.erosion.frequency,
            erosion_octaves: cfg.erosion.octaves.max(1),
            erosion_amplitude: cfg.erosion.amplitude,
            biome_frequency: cfg.biome.frequency,
            caves_enabled: cfg.caves.enable,
            cave_frequency: cfg.caves.frequency,
            cave_threshold: cfg.caves.threshold,
            cave_band_min_ratio: cfg.caves.band_min_ratio,
            cave_band_max_ratio: cfg.caves.band_max_ratio,
            hollow_density: cfg.caves.hollow_density,
            temperature_frequency: cfg.climate.temperature_frequency,
            moisture_frequency: cfg.climate.moisture_frequency,
            blend_radius: cfg.blend.radius,
            view_distance: cfg.stream.view_distance,
            movement_threshold: cfg.stream.movement_threshold,
        })
    }

    /// World-space edge length of one chunk.
    #[inline]
    pub fn chunk_world_size(&self) -> f32 {
        self.chunk_size as f32 * self.voxel_size
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    ZeroChunkSize,
    NonPositiveVoxelSize(f32),
    BlendRadiusTooLarge { radius: usize, chunk_size: usize },
    BadHeightRatio(f32),
    BadCaveBand { min: f32, max: f32 },
    NonPositiveViewDistance(f32),
    NegativeMovementThreshold(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroChunkSize => write!(f, "chunk size must be at least 1"),
            ConfigError::NonPositiveVoxelSize(v) => {
                write!(f, "voxel size must be positive and finite, got {v}")
            }
            ConfigError::BlendRadiusTooLarge { radius, chunk_size } => write!(
                f,
                "blend radius {radius} must be smaller than chunk size {chunk_size}"
            ),
            ConfigError::BadHeightRatio(r) => {
                write!(f, "height max_ratio must be in (0, 1], got {r}")
            }
            ConfigError::BadCaveBand { min, max } => write!(
                f,
                "cave band ratios must satisfy 0 <= min < max <= 1, got [{min}, {max}]"
            ),
            ConfigError::NonPositiveViewDistance(v) => {
                write!(f, "view distance must be positive and finite, got {v}")
            }
            ConfigError::NegativeMovementThreshold(v) => {
                write!(f, "movement threshold must be non-negative, got {v}")
            }
        }
    }
}

impl Error for ConfigError {}

pub fn load_worldgen_config_from_path(path: &Path) -> Result<WorldGenConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: WorldGenConfig = toml::from_str(&s)?;
    Ok(cfg)
}

/// Reads a TOML config file and validates it into [`WorldGenParams`].
pub fn load_params_from_path(path: &Path) -> Result<WorldGenParams, Box<dyn Error>> {
    let cfg = load_worldgen_config_from_path(path)?;
    let params = WorldGenParams::from_config(&cfg)?;
    log::info!(
        "loaded worldgen config from {}: chunk_size={} view_distance={}",
        path.display(),
        params.chunk_size,
        params.view_distance
    );
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let params = WorldGenParams::from_config(&WorldGenConfig::default()).unwrap();
        assert_eq!(params.chunk_size, 32);
        assert!(params.voxel_size > 0.0);
        assert!(params.blend_radius < params.chunk_size);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg: WorldGenConfig = toml::from_str("").unwrap();
        let params = WorldGenParams::from_config(&cfg).unwrap();
        assert_eq!(params.chunk_size, default_chunk_size());
        assert_eq!(params.view_distance, default_view_distance());
    }

    #[test]
    fn partial_toml_overrides_one_section() {
        let cfg: WorldGenConfig = toml::from_str(
            r#"
            [chunk]
            size = 16

            [stream]
            view_distance = 5.0
            "#,
        )
        .unwrap();
        let params = WorldGenParams::from_config(&cfg).unwrap();
        assert_eq!(params.chunk_size, 16);
        assert_eq!(params.view_distance, 5.0);
        // Untouched sections keep their defaults.
        assert_eq!(params.height_frequency, default_height_freq());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let mut cfg = WorldGenConfig::default();
        cfg.chunk.size = 0;
        assert_eq!(
            WorldGenParams::from_config(&cfg),
            Err(ConfigError::ZeroChunkSize)
        );
    }

    #[test]
    fn blend_radius_must_fit_in_chunk() {
        let mut cfg = WorldGenConfig::default();
        cfg.chunk.size = 8;
        cfg.blend.radius = 8;
        assert!(matches!(
            WorldGenParams::from_config(&cfg),
            Err(ConfigError::BlendRadiusTooLarge { .. })
        ));
    }

    #[test]
    fn inverted_cave_band_rejected() {
        let mut cfg = WorldGenConfig::default();
        cfg.caves.band_min_ratio = 0.8;
        cfg.caves.band_max_ratio = 0.2;
        assert!(matches!(
            WorldGenParams::from_config(&cfg),
            Err(ConfigError::BadCaveBand { .. })
        ));
    }

    #[test]
    fn negative_view_distance_rejected() {
        let mut cfg = WorldGenConfig::default();
        cfg.stream.view_distance = -1.0;
        assert!(matches!(
            WorldGenParams::from_config(&cfg),
            Err(ConfigError::NonPositiveViewDistance(_))
        ));
    }
}
