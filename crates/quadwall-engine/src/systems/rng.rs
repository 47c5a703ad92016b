//! Seedable pseudo-random number generator (xorshift64).
//! Deterministic and fast; every particle field and flickering light owns one.

/// Seedable pseudo-random number generator (xorshift64).
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Derive an independent generator from a base seed and a stream key
    /// (usually an entity id), so ordering of mounts does not shift sequences.
    pub fn for_stream(seed: u64, key: &str) -> Self {
        // FNV-1a over the key, folded into the seed.
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in key.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Self::new(seed ^ hash)
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform float in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        // 24 high bits give every representable step below 1.0.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform float in [min, max).
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniform float in [-0.5, 0.5), scaled.
    pub fn centered(&mut self, scale: f32) -> f32 {
        (self.next_f32() - 0.5) * scale
    }
}
