// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding,
// plus the derived samplers the pipeline needs: uniform floats and ranges,
// and Box-Muller Gaussians for latent initialization and film grain.
//
// This crate is the single randomness source for every yent.yo crate. No
// stochastic function reaches for a global or time-seeded generator; each one
// takes a `&mut YentRng` or an explicit `u64` seed. The only place a seed is
// derived from the clock is `YentRng::from_entropy`, which is meant for the
// outermost entry point (a studio or binary) and nowhere else.
//
// **Critical constraint: determinism.** `next_u64` must produce identical
// output for identical prior state on every platform. Latent tensors and
// grain patterns are compared byte-for-byte in tests, so the float samplers
// built on top must stay pure functions of the integer stream.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Xoshiro256++ PRNG with a cached Box-Muller spare.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct YentRng {
    s: [u64; 4],
    /// Second output of the last Box-Muller transform, if not yet consumed.
    spare: Option<f64>,
}

impl YentRng {
    /// Expand `seed` into the 256-bit state with SplitMix64. Equal seeds give
    /// equal streams.
    pub fn new(seed: u64) -> Self {
        let mut state = seed;
        let s = std::array::from_fn(|_| splitmix64(&mut state));
        Self { s, spare: None }
    }

    /// Seed from wall-clock time and the process id. Non-reproducible; use
    /// only at an entry point, then thread the result down explicitly.
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let mut mix = nanos ^ (u64::from(std::process::id()) << 32);
        Self::new(splitmix64(&mut mix))
    }

    pub fn next_u64(&mut self) -> u64 {
        let [s0, s1, s2, s3] = self.s;
        let out = s0.wrapping_add(s3).rotate_left(23).wrapping_add(s0);

        let s2 = s2 ^ s0;
        let s3 = s3 ^ s1;
        let s1 = s1 ^ s2;
        let s0 = s0 ^ s3;
        self.s = [s0, s1, s2 ^ (self.s[1] << 17), s3.rotate_left(45)];

        out
    }

    /// Uniform in [0, 1), 24 bits of precision.
    pub fn next_f32(&mut self) -> f32 {
        const SCALE: f32 = 1.0 / (1u32 << 24) as f32;
        (self.next_u64() >> 40) as f32 * SCALE
    }

    /// Uniform in [0, 1), 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (1u64 << 53) as f64;
        (self.next_u64() >> 11) as f64 * SCALE
    }

    /// Uniform in `[low, high)`. An empty or inverted range yields `low`
    /// without consuming any state.
    pub fn range_f32(&mut self, low: f32, high: f32) -> f32 {
        if !(low < high) {
            return low;
        }
        low + self.next_f32() * (high - low)
    }

    /// Unbiased integer in `[low, high)` by widening multiply with rejection.
    /// An empty range yields `low` without consuming any state.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        let span = high - low;
        let floor = span.wrapping_neg() % span;
        loop {
            let wide = u128::from(self.next_u64()) * u128::from(span);
            if (wide as u64) >= floor {
                return low + (wide >> 64) as u64;
            }
        }
    }

    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Pick a uniformly random element of a non-empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        Some(&items[self.range_usize(0, items.len())])
    }

    /// Standard normal sample (mean 0, std 1) via the Box-Muller transform.
    ///
    /// Each transform yields two independent samples; the second is cached
    /// and returned by the next call, so the stream stays deterministic.
    pub fn next_gaussian(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }
        // 1 - u keeps the log argument in (0, 1].
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let radius = (-2.0 * u1.ln()).sqrt();
        let theta = std::f64::consts::TAU * u2;
        self.spare = Some(radius * theta.sin());
        radius * theta.cos()
    }

    /// Fill a buffer with standard normal `f32` samples.
    pub fn fill_gaussian(&mut self, out: &mut [f32]) {
        for v in out.iter_mut() {
            *v = self.next_gaussian() as f32;
        }
    }
}

/// Seed expander; never used as a stream on its own.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
