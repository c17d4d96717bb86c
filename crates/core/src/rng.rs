//! RNG module - seedable source for board generation
//!
//! Boards must be reproducible from a seed so rounds can be replayed and
//! tested. A small LCG is plenty for drawing digits 1-9 and keeps the core
//! free of platform randomness.

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits; the low bits of a power-of-two LCG cycle with a
    /// very short period.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (self.next_u32() >> 8) % max
    }

    /// Generate a value in the inclusive range [lo, hi]
    pub fn next_inclusive(&mut self, lo: u8, hi: u8) -> u8 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let span = (hi - lo) as u32 + 1;
        lo + self.next_range(span) as u8
    }

    /// Current internal state (reseeding with it continues the same sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);
        assert_ne!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut a = SimpleRng::new(0);
        let mut b = SimpleRng::new(1);
        assert_eq!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn test_next_inclusive_stays_in_range_and_covers_it() {
        let mut rng = SimpleRng::new(7);
        let mut seen = [false; 10];
        for _ in 0..2000 {
            let v = rng.next_inclusive(1, 9);
            assert!((1..=9).contains(&v));
            seen[v as usize] = true;
        }
        assert!(seen[1..=9].iter().all(|&s| s), "every digit should appear");
    }

    #[test]
    fn test_next_range_zero_max() {
        let mut rng = SimpleRng::new(3);
        assert_eq!(rng.next_range(0), 0);
    }

    #[test]
    fn test_state_continues_sequence() {
        let mut rng = SimpleRng::new(99);
        rng.next_u32();
        let mut resumed = SimpleRng::new(rng.state());
        assert_eq!(rng.next_u32(), resumed.next_u32());
    }
}
