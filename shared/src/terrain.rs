//! Procedural terrain height field
//! Uses deterministic noise so terrain, vegetation and collision all agree from one seed
//!
//! Scale: 1 unit = 1 meter
//! - Heights span roughly +/- `TerrainSettings::height` around zero
//! - The same seed and octave parameters give bit-identical heights on every run

use std::collections::HashMap;

use bevy::prelude::*;
use noise::NoiseFn;

use crate::settings::TerrainSettings;

/// Distance used for the central-difference normal estimate (meters)
pub const NORMAL_SAMPLE_STEP: f64 = 1.0;

/// Height cache is flushed wholesale once it grows past this many entries
pub const HEIGHT_CACHE_CAPACITY: usize = 2048;

/// Small seeded PRNG (Mulberry32). Output is in [0, 1].
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        (t ^ (t >> 14)) as f64 / 4_294_967_295.0
    }
}

/// 2D gradient noise over a seeded permutation table.
///
/// Samples are remapped to [0, 1] (0.5 at every lattice point).
#[derive(Debug, Clone)]
pub struct GradientNoise {
    perm: [u8; 512],
}

impl GradientNoise {
    pub fn new(seed: u32) -> Self {
        let mut rng = Mulberry32::new(seed);
        let mut base = [0u8; 256];
        for (i, slot) in base.iter_mut().enumerate() {
            *slot = i as u8;
        }
        // Fisher-Yates, high index down
        for i in (1..256usize).rev() {
            let j = ((rng.next_f64() * (i + 1) as f64) as usize).min(i);
            base.swap(i, j);
        }

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = base[i & 255];
        }
        Self { perm }
    }

    /// The shuffled 256-entry table (first half of the doubled table).
    pub fn permutation(&self) -> &[u8] {
        &self.perm[..256]
    }

    #[inline]
    fn p(&self, i: usize) -> usize {
        self.perm[i] as usize
    }

    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x_floor = x.floor();
        let y_floor = y.floor();
        let xi = (x_floor as i64 & 255) as usize;
        let yi = (y_floor as i64 & 255) as usize;
        let xf = x - x_floor;
        let yf = y - y_floor;
        let u = fade(xf);
        let v = fade(yf);

        let aa = self.p(xi + self.p(yi));
        let ab = self.p(xi + self.p(yi + 1));
        let ba = self.p(xi + 1 + self.p(yi));
        let bb = self.p(xi + 1 + self.p(yi + 1));

        let x1 = lerp(grad(aa, xf, yf), grad(ba, xf - 1.0, yf), u);
        let x2 = lerp(grad(ab, xf, yf - 1.0), grad(bb, xf - 1.0, yf - 1.0), u);
        lerp(x1, x2, v) * 0.5 + 0.5
    }
}

impl NoiseFn<f64, 2> for GradientNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

// Weighted form, not `a + (b - a) * t`: the two round differently.
#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[inline]
fn grad(hash: usize, x: f64, y: f64) -> f64 {
    let h = hash & 3;
    let (u, v) = if h < 2 { (x, y) } else { (y, x) };
    let u = if h & 1 != 0 { -u } else { u };
    let v = if h & 2 != 0 { -2.0 * v } else { 2.0 * v };
    u + v
}

/// Fractal sum of a [0, 1] noise source, normalized back to [0, 1].
#[derive(Debug, Clone)]
pub struct Fractal<N> {
    source: N,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
}

impl<N: NoiseFn<f64, 2>> Fractal<N> {
    pub fn new(source: N, octaves: u32, persistence: f64, lacunarity: f64) -> Self {
        Self {
            source,
            octaves,
            persistence,
            lacunarity,
        }
    }
}

impl<N: NoiseFn<f64, 2>> NoiseFn<f64, 2> for Fractal<N> {
    fn get(&self, point: [f64; 2]) -> f64 {
        let mut amp = 1.0;
        let mut freq = 1.0;
        let mut sum = 0.0;
        let mut norm = 0.0;
        for _ in 0..self.octaves {
            sum += amp * self.source.get([point[0] * freq, point[1] * freq]);
            norm += amp;
            amp *= self.persistence;
            freq *= self.lacunarity;
        }
        if norm == 0.0 {
            return 0.5;
        }
        sum / norm
    }
}

/// Terrain height field: pure function of world (x, z) and the settings' seed.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    fractal: Fractal<GradientNoise>,
    scale: f64,
    max_height: f64,
    seed: u32,
}

impl TerrainGenerator {
    pub fn new(settings: &TerrainSettings) -> Self {
        Self {
            fractal: Fractal::new(
                GradientNoise::new(settings.seed),
                settings.octaves,
                settings.persistence,
                settings.lacunarity,
            ),
            scale: settings.scale,
            max_height: settings.height,
            seed: settings.seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Full-precision elevation at a world position.
    pub fn sample_height(&self, x: f64, z: f64) -> f64 {
        let value = self.fractal.get([x * self.scale, z * self.scale]);
        (value - 0.5) * 2.0 * self.max_height
    }

    /// Terrain height at a world position
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.sample_height(x as f64, z as f64) as f32
    }

    /// Full-precision unit surface normal.
    pub fn sample_normal(&self, x: f64, z: f64) -> [f64; 3] {
        let e = NORMAL_SAMPLE_STEP;
        let h_left = self.sample_height(x - e, z);
        let h_right = self.sample_height(x + e, z);
        let h_down = self.sample_height(x, z - e);
        let h_up = self.sample_height(x, z + e);

        let n = [h_left - h_right, 2.0 * e, h_down - h_up];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        [n[0] / len, n[1] / len, n[2] / len]
    }

    /// Get the terrain normal at a world position
    /// Used for slope tests when placing vegetation
    pub fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        let [nx, ny, nz] = self.sample_normal(x as f64, z as f64);
        Vec3::new(nx as f32, ny as f32, nz as f32)
    }

    /// Build a square ground grid centred on the origin.
    pub fn generate_ground_mesh(&self, size: f32, segments: u32) -> TerrainMeshData {
        let segments = segments.max(1) as usize;
        let verts_per_side = segments + 1;
        let spacing = size / segments as f32;
        let half = size * 0.5;

        let mut positions = Vec::with_capacity(verts_per_side * verts_per_side);
        let mut normals = Vec::with_capacity(verts_per_side * verts_per_side);
        let mut uvs = Vec::with_capacity(verts_per_side * verts_per_side);
        let mut indices = Vec::with_capacity(segments * segments * 6);

        for zi in 0..verts_per_side {
            for xi in 0..verts_per_side {
                let x = -half + xi as f32 * spacing;
                let z = -half + zi as f32 * spacing;
                let y = self.height_at(x, z);
                let n = self.normal_at(x, z);

                positions.push([x, y, z]);
                normals.push([n.x, n.y, n.z]);
                uvs.push([xi as f32 / segments as f32, zi as f32 / segments as f32]);
            }
        }

        for zi in 0..segments {
            for xi in 0..segments {
                let top_left = (zi * verts_per_side + xi) as u32;
                let top_right = top_left + 1;
                let bottom_left = top_left + verts_per_side as u32;
                let bottom_right = bottom_left + 1;

                indices.push(top_left);
                indices.push(bottom_left);
                indices.push(top_right);

                indices.push(top_right);
                indices.push(bottom_left);
                indices.push(bottom_right);
            }
        }

        TerrainMeshData {
            positions,
            normals,
            uvs,
            indices,
        }
    }
}

/// Generated mesh data for the ground
pub struct TerrainMeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

/// Height memo keyed by the nearest integer meter.
///
/// Not an LRU: when the table grows past its cap it is cleared entirely.
#[derive(Debug, Clone, Default)]
pub struct HeightCache {
    entries: HashMap<(i32, i32), f32>,
    capacity: usize,
}

impl HeightCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    /// Round half up, so -2.5 -> -2 and 2.5 -> 3.
    #[inline]
    pub fn round_coord(v: f32) -> i32 {
        (v + 0.5).floor() as i32
    }

    pub fn height(&mut self, generator: &TerrainGenerator, x: f32, z: f32) -> f32 {
        let key = (Self::round_coord(x), Self::round_coord(z));
        if let Some(h) = self.entries.get(&key) {
            return *h;
        }
        let h = generator.height_at(key.0 as f32, key.1 as f32);
        if self.entries.len() > self.capacity {
            self.entries.clear();
        }
        self.entries.insert(key, h);
        h
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resource holding the terrain generator and its collision query cache
#[derive(Resource, Debug, Clone)]
pub struct WorldTerrain {
    pub generator: TerrainGenerator,
    cache: HeightCache,
}

impl WorldTerrain {
    pub fn new(settings: &TerrainSettings) -> Self {
        Self {
            generator: TerrainGenerator::new(settings),
            cache: HeightCache::new(HEIGHT_CACHE_CAPACITY),
        }
    }

    /// Exact height (no rounding).
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.generator.height_at(x, z)
    }

    pub fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        self.generator.normal_at(x, z)
    }

    /// Height at the nearest integer meter, memoized. Used by collision every frame.
    pub fn height_cached(&mut self, x: f32, z: f32) -> f32 {
        self.cache.height(&self.generator, x, z)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl Default for WorldTerrain {
    fn default() -> Self {
        Self::new(&TerrainSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_generator() -> TerrainGenerator {
        TerrainGenerator::new(&TerrainSettings::default())
    }

    #[test]
    fn mulberry_matches_reference_sequence() {
        let mut rng = Mulberry32::new(4242);
        assert!((rng.next_f64() - 0.546_706_133_649_383_3).abs() < 1e-15);
        assert!((rng.next_f64() - 0.278_608_789_266_694_5).abs() < 1e-15);
        assert!((rng.next_f64() - 0.931_236_917_369_821_3).abs() < 1e-15);
    }

    #[test]
    fn permutation_is_seeded_shuffle() {
        let noise = GradientNoise::new(4242);
        assert_eq!(&noise.permutation()[..8], &[87, 133, 36, 204, 155, 201, 175, 200]);

        let mut sorted = noise.permutation().to_vec();
        sorted.sort_unstable();
        let identity: Vec<u8> = (0..=255).collect();
        assert_eq!(sorted, identity);
    }

    #[test]
    fn lattice_points_sample_to_half() {
        let noise = GradientNoise::new(99);
        assert_eq!(noise.sample(0.0, 0.0), 0.5);
        assert_eq!(noise.sample(17.0, -4.0), 0.5);
    }

    #[test]
    fn gradient_noise_reference_values() {
        let noise = GradientNoise::new(4242);
        assert!((noise.sample(0.5, 0.25) - 0.780_151_367_187_5).abs() < 1e-12);
        assert!((noise.sample(3.7, -1.2) - 0.138_948_195_200_000_07).abs() < 1e-12);
    }

    #[test]
    fn height_reference_values() {
        let gen = demo_generator();
        // The origin is a lattice point at every octave.
        assert_eq!(gen.sample_height(0.0, 0.0), 0.0);

        let cases = [
            (10.0, 20.0, 2.314_870_159_603_519_7),
            (-37.5, 112.25, 8.345_650_064_257_134),
            (250.0, -400.0, -0.418_308_387_096_773_65),
            (123.0, 456.0, -1.726_746_449_227_877),
        ];
        for (x, z, expected) in cases {
            let h = gen.sample_height(x, z);
            assert!((h - expected).abs() < 1e-9, "height({x}, {z}) = {h}, expected {expected}");
        }
    }

    #[test]
    fn height_is_deterministic_per_seed() {
        let a = demo_generator();
        let b = demo_generator();
        for i in 0..50 {
            let x = i as f32 * 13.7 - 300.0;
            let z = i as f32 * -7.3 + 120.0;
            assert_eq!(a.height_at(x, z).to_bits(), b.height_at(x, z).to_bits());
            assert_eq!(a.normal_at(x, z), b.normal_at(x, z));
        }

        let other = TerrainGenerator::new(&TerrainSettings {
            seed: 1,
            ..TerrainSettings::default()
        });
        let differs = (0..20).any(|i| {
            let x = i as f32 * 31.0 + 5.5;
            a.height_at(x, x * 0.5) != other.height_at(x, x * 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn normal_is_unit_and_points_up() {
        let gen = demo_generator();
        for i in 0..20 {
            let n = gen.normal_at(i as f32 * 23.0, i as f32 * -11.0);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!(n.y > 0.0);
        }

        let flat = TerrainGenerator::new(&TerrainSettings {
            height: 0.0,
            ..TerrainSettings::default()
        });
        assert_eq!(flat.normal_at(3.0, 4.0), Vec3::Y);
    }

    #[test]
    fn cached_height_matches_rounded_query() {
        let mut terrain = WorldTerrain::default();
        let h = terrain.height_cached(10.4, 19.6);
        assert_eq!(h, terrain.height_at(10.0, 20.0));

        // Same rounded cell hits the memo.
        let again = terrain.height_cached(9.6, 20.2);
        assert_eq!(again, h);
        assert_eq!(terrain.cache_len(), 1);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(HeightCache::round_coord(2.5), 3);
        assert_eq!(HeightCache::round_coord(-2.5), -2);
        assert_eq!(HeightCache::round_coord(-2.6), -3);
    }

    #[test]
    fn cache_flushes_when_over_capacity() {
        let gen = demo_generator();
        let mut cache = HeightCache::new(8);
        for i in 0..9 {
            cache.height(&gen, i as f32, 0.0);
        }
        assert_eq!(cache.len(), 9);
        cache.height(&gen, 100.0, 0.0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.height(&gen, 3.0, 0.0), gen.height_at(3.0, 0.0));
    }

    #[test]
    fn ground_mesh_has_expected_shape() {
        let gen = demo_generator();
        let mesh = gen.generate_ground_mesh(100.0, 4);
        assert_eq!(mesh.positions.len(), 25);
        assert_eq!(mesh.normals.len(), 25);
        assert_eq!(mesh.indices.len(), 4 * 4 * 6);
        assert_eq!(mesh.positions[0][0], -50.0);
        assert_eq!(mesh.positions[24][2], 50.0);
        assert_eq!(mesh.positions[12][1], gen.height_at(0.0, 0.0));
    }
}
