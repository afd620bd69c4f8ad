//! Mulberry32, a 32-bit-state generator with a fixed, portable output stream.
//!
//! The generator is expressed as a pure step function so the same seed gives
//! the same floats on every platform and in every process.

const INCREMENT: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Advance the state once, returning a float in `[0, 1)` and the next state.
pub fn mulberry32_step(state: u32) -> (f64, u32) {
    let next = state.wrapping_add(INCREMENT);
    let mut t = (next ^ (next >> 15)).wrapping_mul(next | 1);
    t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
    let value = (t ^ (t >> 14)) as f64 / TWO_POW_32;
    (value, next)
}

/// Reduce a signed seed to the generator's 32-bit state (modulo 2^32).
pub fn seed_state(seed: i64) -> u32 {
    seed as u32
}

/// Iterator over the Mulberry32 stream for one seed.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: i64) -> Self {
        Self {
            state: seed_state(seed),
        }
    }

    /// Next float in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        let (value, next) = mulberry32_step(self.state);
        self.state = next;
        value
    }

    /// Next float in `[-1, 1)`.
    pub fn next_signed(&mut self) -> f64 {
        self.next_unit() * 2.0 - 1.0
    }
}

impl Iterator for SeededRng {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_unit())
    }
}
