//! RNG oracle and call-local roll streams.
//!
//! Randomness is never drawn from a process-wide generator. A resolution call
//! owns a [`RollStream`] built from a caller-supplied seed; each roll derives a
//! fresh seed from `(call seed, roll index)` and feeds it to a stateless
//! [`RngOracle`]. The same seed therefore replays the same rolls on any thread.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Percent roll in `0..=99`.
    fn roll_percent(&self, seed: u64) -> u32 {
        self.next_u32(seed) % 100
    }

    /// Uniform value in `0..bound`. Returns 0 when `bound` is 0.
    fn below(&self, seed: u64, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.next_u32(seed) % bound
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: 32-bit output from 64-bit state, one multiply plus a
/// xorshift and a data-dependent rotate.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Compute a deterministic call seed from host context.
///
/// # Arguments
///
/// * `world_seed` - Base seed fixed for a save or session
/// * `nonce` - Host sequence number (container open count, spawn counter, ...)
/// * `subject` - Actor the list is resolved for
/// * `context` - Distinguishes several resolutions within the same event
pub fn compute_seed(world_seed: u64, nonce: u64, subject: u64, context: u32) -> u64 {
    // SplitMix64 / FxHash style combiners
    let mut hash = world_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= subject.wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);
    avalanche(hash)
}

#[inline]
fn avalanche(mut hash: u64) -> u64 {
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ceb9fe1a85ec53);
    hash ^= hash >> 33;
    hash
}

/// Sequence of rolls owned by a single resolution call.
pub struct RollStream<'r> {
    rng: &'r dyn RngOracle,
    seed: u64,
    cursor: u64,
}

impl<'r> RollStream<'r> {
    pub fn new(rng: &'r dyn RngOracle, seed: u64) -> Self {
        Self {
            rng,
            seed,
            cursor: 0,
        }
    }

    fn next_seed(&mut self) -> u64 {
        let seed = avalanche(self.seed ^ self.cursor.wrapping_mul(0x9e3779b97f4a7c15));
        self.cursor += 1;
        seed
    }

    /// Percent roll in `0..=99`.
    pub fn percent(&mut self) -> u32 {
        let seed = self.next_seed();
        self.rng.roll_percent(seed)
    }

    /// Uniform value in `0..bound`.
    pub fn below(&mut self, bound: u32) -> u32 {
        let seed = self.next_seed();
        self.rng.below(seed, bound)
    }

    /// Uniform value in `0..bound` for bounds wider than `u32`.
    ///
    /// Consumes a single roll, like [`Self::below`].
    pub fn below_wide(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        let seed = self.next_seed();
        let high = u64::from(self.rng.next_u32(seed));
        let low = u64::from(self.rng.next_u32(avalanche(seed)));
        ((high << 32) | low) % bound
    }

    /// Number of rolls consumed so far.
    pub fn consumed(&self) -> u64 {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcg_is_deterministic() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
        assert_ne!(rng.next_u32(42), rng.next_u32(43));
    }

    #[test]
    fn streams_replay_for_same_seed() {
        let rng = PcgRng;
        let mut a = RollStream::new(&rng, 7);
        let mut b = RollStream::new(&rng, 7);
        let rolls_a: Vec<u32> = (0..16).map(|_| a.percent()).collect();
        let rolls_b: Vec<u32> = (0..16).map(|_| b.percent()).collect();
        assert_eq!(rolls_a, rolls_b);
        assert_eq!(a.consumed(), 16);
        assert!(rolls_a.iter().all(|&roll| roll < 100));
    }

    #[test]
    fn below_zero_bound_is_zero() {
        let rng = PcgRng;
        let mut stream = RollStream::new(&rng, 1);
        assert_eq!(stream.below(0), 0);
        assert!(stream.below(3) < 3);
    }

    #[test]
    fn wide_bounds_cover_the_upper_range() {
        let rng = PcgRng;
        let mut stream = RollStream::new(&rng, 3);
        let bound = u64::from(u32::MAX) * 2;
        let rolls: Vec<u64> = (0..64).map(|_| stream.below_wide(bound)).collect();
        assert!(rolls.iter().all(|&roll| roll < bound));
        assert!(rolls.iter().any(|&roll| roll > u64::from(u32::MAX)));
        assert_eq!(stream.consumed(), 64);
        assert_eq!(stream.below_wide(0), 0);
    }

    #[test]
    fn compute_seed_mixes_every_input() {
        let base = compute_seed(1, 2, 3, 0);
        assert_ne!(base, compute_seed(1, 2, 3, 1));
        assert_ne!(base, compute_seed(1, 2, 4, 0));
        assert_ne!(base, compute_seed(1, 3, 3, 0));
        assert_ne!(base, compute_seed(2, 2, 3, 0));
    }
}
