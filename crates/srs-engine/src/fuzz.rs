//! Injectable fuzz source (`spec.md` §4.3, §9 "mutable global RNG"). The
//! source mutates a module-wide RNG; here the generator is a trait object
//! threaded through the engine, so production wires a time-seeded PRNG and
//! tests wire a deterministic stream.

use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Produces the uniform fuzz offset applied to `review + Good` intervals.
pub trait FuzzSource: Send + Sync {
    /// Returns a value drawn uniformly from `[-1.0, 1.0]`; the caller scales
    /// it by the configured fuzz percentage and the raw interval.
    fn sample_unit_offset(&mut self) -> f64;
}

/// Production fuzz source, seeded once from OS entropy at process startup.
pub struct ProcessRng(StdRng);

impl ProcessRng {
    /// Seeds a new generator from an unpredictable source.
    #[must_use]
    pub fn seeded() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl FuzzSource for ProcessRng {
    fn sample_unit_offset(&mut self) -> f64 {
        self.0.gen_range(-1.0..=1.0)
    }
}

/// Deterministic fuzz source for tests: replays a fixed sequence of
/// offsets, cycling once exhausted.
pub struct FixedFuzz {
    offsets: Vec<f64>,
    cursor: usize,
}

impl FixedFuzz {
    /// Builds a fuzz source that always returns `offset`.
    #[must_use]
    pub fn constant(offset: f64) -> Self {
        Self {
            offsets: vec![offset],
            cursor: 0,
        }
    }

    /// Builds a fuzz source replaying `offsets` in order, wrapping around.
    #[must_use]
    pub fn sequence(offsets: Vec<f64>) -> Self {
        assert!(!offsets.is_empty(), "fuzz sequence must not be empty");
        Self { offsets, cursor: 0 }
    }
}

impl FuzzSource for FixedFuzz {
    fn sample_unit_offset(&mut self) -> f64 {
        let value = self.offsets[self.cursor % self.offsets.len()];
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_fuzz_always_returns_same_value() {
        let mut fuzz = FixedFuzz::constant(0.5);
        assert!((fuzz.sample_unit_offset() - 0.5).abs() < f64::EPSILON);
        assert!((fuzz.sample_unit_offset() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn sequence_fuzz_cycles() {
        let mut fuzz = FixedFuzz::sequence(vec![-1.0, 0.0, 1.0]);
        assert!((fuzz.sample_unit_offset() + 1.0).abs() < f64::EPSILON);
        assert!((fuzz.sample_unit_offset() - 0.0).abs() < f64::EPSILON);
        assert!((fuzz.sample_unit_offset() - 1.0).abs() < f64::EPSILON);
        assert!((fuzz.sample_unit_offset() + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn process_rng_stays_within_unit_range() {
        let mut rng = ProcessRng::seeded();
        for _ in 0..100 {
            let value = rng.sample_unit_offset();
            assert!((-1.0..=1.0).contains(&value));
        }
    }
}
