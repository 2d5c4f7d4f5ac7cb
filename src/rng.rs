const LCG_MULTIPLIER: u64 = 1_664_525;
const LCG_INCREMENT: u64 = 1_013_904_223;
const LCG_MODULUS: u64 = 1 << 32;

/// Deterministic linear-congruential generator.
///
/// Levels are regenerated from their level number alone, so the recurrence is
/// fixed here instead of relying on a platform generator:
/// `state' = (state * A + C) mod 2^32`, output `state' / 2^32`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % LCG_MODULUS,
        }
    }

    pub fn state(&self) -> u64 {
        self.state
    }

    fn step(&mut self) -> u64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.state
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.step() as f64 / LCG_MODULUS as f64
    }

    /// Uniform index in `0..upper_exclusive`. Always consumes one draw.
    pub fn range_usize(&mut self, upper_exclusive: usize) -> usize {
        let value = (self.next_f64() * upper_exclusive as f64) as usize;
        value.min(upper_exclusive.saturating_sub(1))
    }

    /// Fisher-Yates shuffle in place, one draw per position from the back.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.range_usize(i + 1);
            items.swap(i, j);
        }
    }
}
