use serde::{Deserialize, Serialize};

/// Memory ceiling per executor, in gigabytes. Executor memory is
/// allocated at 1 GB per executor core, so per-executor cores saturate
/// together with this cap.
pub const EXECUTOR_MEMORY_CAP_GB: u32 = 4;

/// Cluster resource configuration derived from a dataset's byte size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterPlan {
    /// Cores per executor. Always even and at least 2.
    pub executor_cores: u32,
    /// Memory per executor in gigabytes, in [1, 4].
    pub executor_memory_gb: u32,
    /// Total core budget for the session. Uncapped here; the session
    /// applies the operational ceiling.
    pub max_cores: u32,
}

impl ClusterPlan {
    /// Executor memory in the "<n>g" form the session config consumes.
    pub fn executor_memory(&self) -> String {
        format!("{}g", self.executor_memory_gb)
    }
}

/// Maps a dataset byte size to a [`ClusterPlan`].
///
/// The mapping is deliberately simple: two cores per gigabyte plus a
/// two-core floor, rounded up to even. The contract is monotonicity
/// (more data never gets fewer cores) and evenness, not optimality.
pub struct SizeEstimator;

impl SizeEstimator {
    pub fn plan(byte_size: u64) -> ClusterPlan {
        let gb = byte_size as f64 / (1u64 << 30) as f64;
        // Saturate below u32::MAX so rounding up to even cannot
        // overflow on extreme byte sizes.
        let raw = (gb * 2.0).floor() + 2.0;
        let mut cores = raw.min((u32::MAX - 1) as f64) as u32;
        if cores % 2 == 1 {
            cores += 1;
        }
        let clamped = cores.min(EXECUTOR_MEMORY_CAP_GB);
        ClusterPlan {
            executor_cores: clamped,
            executor_memory_gb: clamped,
            max_cores: cores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: f64 = (1u64 << 30) as f64;

    #[test]
    fn executor_cores_even_and_at_least_two() {
        for byte_size in [0, 1, 512 << 20, 1 << 30, 3 << 30, 100 << 30, u64::MAX >> 8, u64::MAX] {
            let plan = SizeEstimator::plan(byte_size);
            assert!(plan.executor_cores >= 2, "byte_size={}", byte_size);
            assert_eq!(plan.executor_cores % 2, 0, "byte_size={}", byte_size);
            assert!(plan.executor_memory_gb >= 1);
            assert!(plan.executor_memory_gb <= EXECUTOR_MEMORY_CAP_GB);
        }
    }

    #[test]
    fn cores_monotone_in_byte_size() {
        let mut previous_exec = 0;
        let mut previous_max = 0;
        for gb in 0..64 {
            let plan = SizeEstimator::plan((gb as u64) << 29);
            assert!(plan.executor_cores >= previous_exec);
            assert!(plan.max_cores >= previous_max);
            previous_exec = plan.executor_cores;
            previous_max = plan.max_cores;
        }
        let extreme = SizeEstimator::plan(u64::MAX);
        assert!(extreme.executor_cores >= previous_exec);
        assert!(extreme.max_cores >= previous_max);
    }

    #[test]
    fn extreme_byte_size_saturates_to_an_even_plan() {
        let plan = SizeEstimator::plan(u64::MAX);
        assert_eq!(plan.max_cores % 2, 0);
        assert_eq!(plan.max_cores, u32::MAX - 1);
        assert_eq!(plan.executor_cores, 4);
        assert_eq!(plan.executor_memory(), "4g");
    }

    #[test]
    fn small_dataset_scenario() {
        // 0.365 GB: floor(0.73) + 2 = 2 cores, 2 GB memory.
        let plan = SizeEstimator::plan((0.365 * GIB) as u64);
        assert_eq!(plan.executor_cores, 2);
        assert_eq!(plan.executor_memory(), "2g");
        assert_eq!(plan.max_cores, 2);
    }

    #[test]
    fn large_dataset_scenario() {
        // 18.27 GB: raw cores 38; executor cores saturate with the
        // 4 GB memory cap while max_cores keeps the full budget.
        let plan = SizeEstimator::plan((18.27 * GIB) as u64);
        assert_eq!(plan.executor_cores, 4);
        assert_eq!(plan.executor_memory(), "4g");
        assert_eq!(plan.max_cores, 38);
    }

    #[test]
    fn odd_core_counts_round_up() {
        // 2.5 GB: floor(5.0) + 2 = 7, rounded up to 8.
        let plan = SizeEstimator::plan((2.5 * GIB) as u64);
        assert_eq!(plan.max_cores, 8);
    }
}
