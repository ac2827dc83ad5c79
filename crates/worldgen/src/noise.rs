use serde::{Deserialize, Serialize};

/// Fractal noise parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Number of noise layers summed together.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Cells per gradient lattice step at the base octave. Larger is smoother.
    pub scale: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            persistence: 0.01,
            lacunarity: 2.0,
            scale: 30.0,
        }
    }
}

const GRADIENTS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 1.0),
    (1.0, -1.0),
    (-1.0, 1.0),
    (-1.0, -1.0),
];

/// Generate a `height x width` noise map normalised to `[0, 1]`.
///
/// A map with no variation (including a single cell) is filled with `0.5`.
pub fn noise_map(width: usize, height: usize, params: &NoiseParams, seed: i64) -> Vec<Vec<f64>> {
    let _span = tracing::debug_span!("noise_map", width, height, seed).entered();

    let octaves: Vec<(f64, f64)> = (0..params.octaves)
        .map(|o| {
            (
                params.lacunarity.powi(o as i32),
                params.persistence.powi(o as i32),
            )
        })
        .collect();

    let mut map = vec![vec![0.0; width]; height];
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for (y, row) in map.iter_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            let mut value = 0.0;
            for &(frequency, amplitude) in &octaves {
                let sx = x as f64 / params.scale * frequency;
                let sy = y as f64 / params.scale * frequency;
                value += gradient_noise(sx, sy, seed) * amplitude;
            }
            *cell = value;
            min = min.min(value);
            max = max.max(value);
        }
    }

    let range = max - min;
    for row in map.iter_mut() {
        for cell in row.iter_mut() {
            *cell = if range > 0.0 { (*cell - min) / range } else { 0.5 };
        }
    }

    map
}

/// Single-octave 2D gradient noise at a sample point.
fn gradient_noise(x: f64, y: f64, seed: i64) -> f64 {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let (x1, y1) = (x0 + 1, y0 + 1);

    let sx = fade(x - x0 as f64);
    let sy = fade(y - y0 as f64);

    let n0 = dot_gradient(x0, y0, x, y, seed);
    let n1 = dot_gradient(x1, y0, x, y, seed);
    let n2 = dot_gradient(x0, y1, x, y, seed);
    let n3 = dot_gradient(x1, y1, x, y, seed);

    lerp(lerp(n0, n1, sx), lerp(n2, n3, sx), sy)
}

fn dot_gradient(ix: i64, iy: i64, x: f64, y: f64, seed: i64) -> f64 {
    let (gx, gy) = GRADIENTS[(lattice_hash(ix, iy, seed) % GRADIENTS.len() as u64) as usize];
    gx * (x - ix as f64) + gy * (y - iy as f64)
}

/// Smootherstep: 6t^5 - 15t^4 + 10t^3.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

fn lattice_hash(ix: i64, iy: i64, seed: i64) -> u64 {
    splitmix64(splitmix64(splitmix64(seed as u64) ^ ix as u64) ^ iy as u64)
}

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn noise_is_zero_on_lattice_points() {
        assert_eq!(gradient_noise(3.0, 7.0, 42), 0.0);
        assert_eq!(gradient_noise(-2.0, 0.0, 42), 0.0);
    }

    #[test]
    fn map_is_normalised() {
        let map = noise_map(32, 24, &NoiseParams::default(), 9);
        assert_eq!(map.len(), 24);
        assert!(map.iter().all(|r| r.len() == 32));
        let values: Vec<f64> = map.iter().flatten().copied().collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!((min - 0.0).abs() < 1e-12);
        assert!((max - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_cell_map_is_flat() {
        let map = noise_map(1, 1, &NoiseParams::default(), 5);
        assert_eq!(map, vec![vec![0.5]]);
    }

    #[test]
    fn same_seed_same_map() {
        let p = NoiseParams::default();
        assert_eq!(noise_map(16, 16, &p, 123), noise_map(16, 16, &p, 123));
    }

    #[test]
    fn different_seeds_diverge() {
        let p = NoiseParams::default();
        assert_ne!(noise_map(64, 64, &p, 1), noise_map(64, 64, &p, 2));
    }
}
