//! Deterministic seeded shuffling for session orderings.
//!
//! The generator reproduces, bit for bit, the 32-bit hash-fold plus
//! xorshift-style PRNG the web client shipped with, so a unit's "Today's 10"
//! ordering is identical across platforms and reloads. The constants are not
//! a tuned contract, only a reproducibility one: changing them silently
//! reshuffles every student's saved mental ordering.

//
// ─── SEEDED RNG ───────────────────────────────────────────────────────────────
//

/// 32-bit deterministic generator seeded from a string.
///
/// Seeding folds each UTF-16 code unit of the seed into the state via
/// `state = state * 31 + code_unit` with wraparound. Draws run an
/// xorshift/multiply mix and yield floats in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Seeds the generator from a string, e.g. a unit key like `"1A-u01"`.
    #[must_use]
    pub fn from_seed_str(seed: &str) -> Self {
        let mut state: u32 = 0;
        for unit in seed.encode_utf16() {
            // state * 31 + code unit, wrapping at 32 bits
            state = state
                .wrapping_shl(5)
                .wrapping_sub(state)
                .wrapping_add(u32::from(unit));
        }
        Self { state }
    }

    /// Advances the state and returns the next raw 32-bit draw.
    pub fn next_u32(&mut self) -> u32 {
        let mut s = self.state;
        s = (s ^ (s >> 15)).wrapping_mul(1 | s);
        s ^= s.wrapping_add((s ^ (s >> 7)).wrapping_mul(61 | s));
        self.state = s;
        s ^ (s >> 14)
    }

    /// Returns the next draw as a float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

//
// ─── FISHER-YATES ─────────────────────────────────────────────────────────────
//

/// Shuffles the slice in place with a Fisher–Yates pass driven by `rng`.
///
/// Same seed and same input ordering produce the identical output ordering
/// on every platform.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn seeded_shuffle<T>(items: &mut [T], rng: &mut SeededRng) {
    for i in (1..items.len()).rev() {
        // next_f64() < 1.0, so j <= i always holds
        let j = (rng.next_f64() * (i as f64 + 1.0)) as usize;
        items.swap(i, j);
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
