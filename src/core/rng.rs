//! Deterministic random number generation with forking.
//!
//! The search layer forks the simulation thousands of times per decision;
//! every fork needs an independent but reproducible random stream so the
//! same seed replays the same decision. Tie-breaking between equally scored
//! move combinations is the main consumer of randomness in the engine core.
//!
//! ```
//! use grid_arena::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let mut branch = rng.fork();
//!
//! // Forks are deterministic: the same fork counter yields the same stream.
//! let mut rng2 = GameRng::new(42);
//! let mut branch2 = rng2.fork();
//! assert_eq!(branch.gen_range_usize(0..1000), branch2.gen_range_usize(0..1000));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG with forking for search branches.
///
/// ChaCha8 keeps the stream fast while staying reproducible across
/// platforms.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Fork this RNG into an independent branch.
    ///
    /// Each fork produces a different but deterministic sequence.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self
            .seed
            .wrapping_add(self.fork_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Self {
            inner: ChaCha8Rng::seed_from_u64(fork_seed),
            seed: fork_seed,
            fork_counter: 0,
        }
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }
}
