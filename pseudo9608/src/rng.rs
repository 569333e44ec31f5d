//! A small hand-rolled PRNG for `RND`/`RANDOMBETWEEN` (SPEC_FULL.md §4.5).
//!
//! Deliberately not `rand`: none of the example repos in the retrieval pack
//! pull in a randomness crate for this kind of single-stream, non-crypto
//! generator, and splitmix64 is a few lines of arithmetic. Seeded from
//! `std::time::SystemTime` by default, or a fixed value for reproducible runs
//! (`--seed`, SPEC_FULL.md §4.8).

/// splitmix64, as described by Vigna. Deterministic given a seed; used both
/// to drive the generator directly and to mix a wall-clock seed into
/// something less correlated than the raw timestamp.
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn from_time() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x2545F4914F6CDD1D);
        Self::new(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// A value in `[0.0, 1.0)`, for `RND`.
    pub fn next_f64(&mut self) -> f64 {
        // Top 53 bits give a uniformly distributed double mantissa.
        let bits = self.next_u64() >> 11;
        bits as f64 / (1u64 << 53) as f64
    }

    /// A value in the inclusive range `[lower, upper]`, for `RANDOMBETWEEN`.
    /// Caller guarantees `lower <= upper`.
    pub fn next_range(&mut self, lower: i64, upper: i64) -> i64 {
        let span = (upper - lower) as u64 + 1;
        lower + (self.next_u64() % span) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rnd_stays_in_unit_interval() {
        let mut rng = Rng::new(42);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn random_between_stays_in_bounds() {
        let mut rng = Rng::new(7);
        for _ in 0..1000 {
            let v = rng.next_range(5, 5);
            assert_eq!(v, 5);
        }
        for _ in 0..1000 {
            let v = rng.next_range(-3, 3);
            assert!((-3..=3).contains(&v));
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_sequence() {
        let mut a = Rng::new(123);
        let mut b = Rng::new(123);
        for _ in 0..10 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }
}
