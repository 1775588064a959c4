use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{BenchError, BenchResult};
use crate::frame::Frame;

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;

/// Seeded train/test partitioner.
///
/// Each row is independently assigned to the test side with probability
/// `test_fraction` by an RNG seeded from `seed`, so exact split sizes
/// vary with the dataset but the same `(seed, dataset)` pair always
/// yields the same partition. Reproducibility is the contract, not
/// exact proportion.
#[derive(Debug, Clone, Copy)]
pub struct DeterministicSplitter {
    seed: u64,
    test_fraction: f64,
}

impl DeterministicSplitter {
    pub fn new(seed: u64, test_fraction: f64) -> BenchResult<Self> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(BenchError::Config(format!(
                "test_fraction must lie in (0, 1), got {}",
                test_fraction
            )));
        }
        Ok(DeterministicSplitter { seed, test_fraction })
    }

    /// Splits `frame` into `(train, test)`. Every row lands on exactly
    /// one side; row order is preserved within each side.
    pub fn split(&self, frame: &Frame) -> (Frame, Frame) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let test_mask: Vec<bool> = (0..frame.len())
            .map(|_| rng.gen::<f64>() < self.test_fraction)
            .collect();
        let train_mask: Vec<bool> = test_mask.iter().map(|&t| !t).collect();
        (frame.retain_rows(&train_mask), frame.retain_rows(&test_mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    fn frame_with_ids(n: usize) -> Frame {
        let mut frame = Frame::new();
        frame
            .insert(
                "id",
                Column::Str((0..n).map(|i| Some(format!("r{}", i))).collect()),
            )
            .unwrap();
        frame
    }

    fn ids(frame: &Frame) -> Vec<String> {
        frame
            .strings("id")
            .unwrap()
            .iter()
            .map(|v| v.clone().unwrap())
            .collect()
    }

    #[test]
    fn same_seed_same_partition() {
        let frame = frame_with_ids(200);
        let splitter = DeterministicSplitter::new(7, 0.2).unwrap();
        let (train_a, test_a) = splitter.split(&frame);
        let (train_b, test_b) = splitter.split(&frame);
        assert_eq!(ids(&train_a), ids(&train_b));
        assert_eq!(ids(&test_a), ids(&test_b));
    }

    #[test]
    fn partition_is_disjoint_and_exhaustive() {
        let frame = frame_with_ids(500);
        let splitter = DeterministicSplitter::new(DEFAULT_SEED, 0.3).unwrap();
        let (train, test) = splitter.split(&frame);

        assert_eq!(train.len() + test.len(), frame.len());
        let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
        for id in ids(&train).into_iter().chain(ids(&test)) {
            assert!(seen.insert(id), "row assigned to both sides");
        }
        assert_eq!(seen.len(), frame.len());
    }

    #[test]
    fn both_sides_populated_on_large_input() {
        let frame = frame_with_ids(1000);
        let splitter = DeterministicSplitter::new(1, DEFAULT_TEST_FRACTION).unwrap();
        let (train, test) = splitter.split(&frame);
        assert!(!train.is_empty());
        assert!(!test.is_empty());
    }

    #[test]
    fn rejects_degenerate_fractions() {
        for fraction in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                DeterministicSplitter::new(0, fraction),
                Err(BenchError::Config(_))
            ));
        }
    }
}
