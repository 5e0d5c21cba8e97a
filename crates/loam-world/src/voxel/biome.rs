use serde::{Deserialize, Serialize};

/// Terrain biome driving the heightfield shape. Classified from one
/// low-frequency noise sample so large contiguous regions share a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainBiome {
    Plains,
    Forest,
    Mountains,
    Desert,
    Tundra,
    Swamp,
}

impl TerrainBiome {
    /// Maps a noise value in [-1, 1] onto the biome ladder. Exhaustive over
    /// the input range; ties go to the higher rung.
    pub fn classify(noise: f32) -> Self {
        if noise < -0.6 {
            TerrainBiome::Tundra
        } else if noise < -0.2 {
            TerrainBiome::Mountains
        } else if noise < 0.2 {
            TerrainBiome::Plains
        } else if noise < 0.5 {
            TerrainBiome::Forest
        } else if noise < 0.75 {
            TerrainBiome::Swamp
        } else {
            TerrainBiome::Desert
        }
    }

    /// Fraction of the maximum terrain height this biome reaches, in (0, 1].
    #[inline]
    pub fn height_modifier(self) -> f32 {
        match self {
            TerrainBiome::Plains => 0.35,
            TerrainBiome::Forest => 0.55,
            TerrainBiome::Mountains => 1.0,
            TerrainBiome::Desert => 0.45,
            TerrainBiome::Tundra => 0.65,
            TerrainBiome::Swamp => 0.25,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TerrainBiome::Plains => "plains",
            TerrainBiome::Forest => "forest",
            TerrainBiome::Mountains => "mountains",
            TerrainBiome::Desert => "desert",
            TerrainBiome::Tundra => "tundra",
            TerrainBiome::Swamp => "swamp",
        }
    }
}

/// Climate biome derived from temperature, moisture, and normalized height.
/// Purely descriptive; it never feeds back into terrain shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimateBiome {
    Ocean,
    Beach,
    Plains,
    Forest,
    Jungle,
    Desert,
    Tundra,
    Mountain,
    SnowPeak,
}

impl ClimateBiome {
    /// All inputs are expected in [0, 1]. Height rules win over climate
    /// rules so coastlines and peaks stay stable across climate bands.
    pub fn classify(temperature: f32, moisture: f32, height01: f32) -> Self {
        if height01 < 0.18 {
            return ClimateBiome::Ocean;
        }
        if height01 < 0.22 {
            return ClimateBiome::Beach;
        }
        if height01 > 0.85 {
            return ClimateBiome::SnowPeak;
        }
        if height01 > 0.7 {
            return ClimateBiome::Mountain;
        }
        if temperature < 0.25 {
            return ClimateBiome::Tundra;
        }
        if temperature > 0.75 && moisture < 0.35 {
            return ClimateBiome::Desert;
        }
        if temperature > 0.6 && moisture > 0.6 {
            return ClimateBiome::Jungle;
        }
        if moisture > 0.55 {
            return ClimateBiome::Forest;
        }
        ClimateBiome::Plains
    }

    pub fn name(self) -> &'static str {
        match self {
            ClimateBiome::Ocean => "ocean",
            ClimateBiome::Beach => "beach",
            ClimateBiome::Plains => "plains",
            ClimateBiome::Forest => "forest",
            ClimateBiome::Jungle => "jungle",
            ClimateBiome::Desert => "desert",
            ClimateBiome::Tundra => "tundra",
            ClimateBiome::Mountain => "mountain",
            ClimateBiome::SnowPeak => "snow_peak",
        }
    }
}

/// Per-chunk biome record: the terrain biome that shaped the chunk plus the
/// climate readout at its center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeAssignment {
    pub terrain: TerrainBiome,
    pub climate: ClimateBiome,
    pub temperature: f32,
    pub moisture: f32,
    pub height01: f32,
}
