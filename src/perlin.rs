//! Seedable gradient noise for the density spawn pattern.
//!
//! Classic permutation-table Perlin noise with octave summation. The table is
//! shuffled from a caller-supplied seed so a given seed always reproduces the
//! same field, which keeps density spawns regression-testable.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// 3D gradient noise generator with tunable octave stack.
#[derive(Debug, Clone)]
pub struct PerlinGenerator {
    /// Number of octaves summed per sample. Zero yields a constant 0 field.
    pub octaves: u32,
    /// Amplitude falloff between octaves. `persistence^i` scales octave `i`,
    /// so 0 keeps only the base octave.
    pub persistence: f32,
    /// Spatial divisor applied to input coordinates before sampling.
    pub zoom: f32,
    perm: [u8; 512],
}

impl PerlinGenerator {
    pub fn new(seed: u64, octaves: u32, persistence: f32, zoom: f32) -> Self {
        let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);
        let mut rng = SmallRng::seed_from_u64(seed);
        table.shuffle(&mut rng);

        let mut perm = [0u8; 512];
        for i in 0..512 {
            perm[i] = table[i & 255];
        }

        Self {
            octaves,
            persistence,
            zoom,
            perm,
        }
    }

    /// Sample the octave-summed noise field at `(x, y, z)`.
    ///
    /// Coordinates are divided by `zoom` first; each octave doubles frequency
    /// and scales amplitude by `persistence^i`.
    pub fn noise(&self, x: f32, y: f32, z: f32) -> f32 {
        let x = x / self.zoom;
        let y = y / self.zoom;
        let z = z / self.zoom;

        let mut total = 0.0;
        for i in 0..self.octaves {
            let frequency = (1u32 << i) as f32;
            let amplitude = if i == 0 {
                1.0
            } else {
                self.persistence.powi(i as i32)
            };
            total += self.raw_noise(x * frequency, y * frequency, z * frequency) * amplitude;
        }
        total
    }

    /// Single-octave noise in roughly [-1, 1].
    fn raw_noise(&self, x: f32, y: f32, z: f32) -> f32 {
        let xi = (x.floor() as i32 & 255) as usize;
        let yi = (y.floor() as i32 & 255) as usize;
        let zi = (z.floor() as i32 & 255) as usize;

        let xf = x - x.floor();
        let yf = y - y.floor();
        let zf = z - z.floor();

        let u = fade(xf);
        let v = fade(yf);
        let w = fade(zf);

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        let x1 = lerp(
            grad(p[aa], xf, yf, zf),
            grad(p[ba], xf - 1.0, yf, zf),
            u,
        );
        let x2 = lerp(
            grad(p[ab], xf, yf - 1.0, zf),
            grad(p[bb], xf - 1.0, yf - 1.0, zf),
            u,
        );
        let y1 = lerp(x1, x2, v);

        let x1 = lerp(
            grad(p[aa + 1], xf, yf, zf - 1.0),
            grad(p[ba + 1], xf - 1.0, yf, zf - 1.0),
            u,
        );
        let x2 = lerp(
            grad(p[ab + 1], xf, yf - 1.0, zf - 1.0),
            grad(p[bb + 1], xf - 1.0, yf - 1.0, zf - 1.0),
            u,
        );
        let y2 = lerp(x1, x2, v);

        lerp(y1, y2, w)
    }
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Hash the low bits into one of 12 edge-vector gradients.
fn grad(hash: u8, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    let u = if h & 1 == 0 { u } else { -u };
    let v = if h & 2 == 0 { v } else { -v };
    u + v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_field() {
        let a = PerlinGenerator::new(42, 1, 0.0, 10.0);
        let b = PerlinGenerator::new(42, 1, 0.0, 10.0);
        for i in 0..50 {
            let t = i as f32 * 0.37;
            assert_eq!(a.noise(t, t * 0.5, -t), b.noise(t, t * 0.5, -t));
        }
    }

    #[test]
    fn test_different_seed_different_field() {
        let a = PerlinGenerator::new(1, 1, 0.0, 10.0);
        let b = PerlinGenerator::new(2, 1, 0.0, 10.0);
        let mut any_differ = false;
        for i in 0..50 {
            let t = i as f32 * 0.37;
            if a.noise(t, t * 0.5, -t) != b.noise(t, t * 0.5, -t) {
                any_differ = true;
                break;
            }
        }
        assert!(any_differ);
    }

    #[test]
    fn test_zero_octaves_is_flat() {
        let noise = PerlinGenerator::new(7, 0, 0.5, 10.0);
        assert_eq!(noise.noise(1.3, -4.2, 0.8), 0.0);
    }

    #[test]
    fn test_output_is_bounded() {
        let noise = PerlinGenerator::new(99, 3, 0.5, 2.0);
        for i in 0..200 {
            let t = i as f32 * 0.113;
            let n = noise.noise(t, 100.0 - t, t * 2.0);
            // Three octaves at persistence 0.5 sum to at most 1.75x one octave.
            assert!(n.abs() < 2.0, "noise out of range: {n}");
        }
    }

    #[test]
    fn test_zero_persistence_keeps_base_octave() {
        let one = PerlinGenerator::new(5, 1, 0.0, 10.0);
        let many = PerlinGenerator::new(5, 4, 0.0, 10.0);
        for i in 0..20 {
            let t = i as f32 * 0.91;
            let a = one.noise(t, t, t);
            let b = many.noise(t, t, t);
            assert!((a - b).abs() < 1e-6);
        }
    }
}
