use fastnoise_lite::{FastNoiseLite, NoiseType};

/// Seeded OpenSimplex2 field with hand-rolled fractal octave summation.
/// Samples are deterministic for a given seed and stay in [-1, 1].
pub struct NoiseField {
    noise: FastNoiseLite,
    octaves: u32,
}

impl NoiseField {
    pub fn new(seed: i32, frequency: f32, octaves: u32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(frequency));
        Self {
            noise,
            octaves: octaves.max(1),
        }
    }

    pub fn sample2(&self, x: f32, z: f32) -> f32 {
        let mut amplitude = 1.0f32;
        let mut scale = 1.0f32;
        let mut sum = 0.0f32;
        let mut norm = 0.0f32;
        for _ in 0..self.octaves {
            sum += amplitude * self.noise.get_noise_2d(x * scale, z * scale);
            norm += amplitude;
            amplitude *= 0.5;
            scale *= 2.0;
        }
        sum / norm
    }

    pub fn sample3(&self, x: f32, y: f32, z: f32) -> f32 {
        let mut amplitude = 1.0f32;
        let mut scale = 1.0f32;
        let mut sum = 0.0f32;
        let mut norm = 0.0f32;
        for _ in 0..self.octaves {
            sum += amplitude * self.noise.get_noise_3d(x * scale, y * scale, z * scale);
            norm += amplitude;
            amplitude *= 0.5;
            scale *= 2.0;
        }
        sum / norm
    }
}
