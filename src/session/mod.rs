use tracing::{debug, info};

use crate::error::{BenchError, BenchResult};
use crate::sizing::ClusterPlan;

/// Operational ceiling on the session's total core budget.
pub const CORE_CEILING: u32 = 32;

/// Idle timeout after which the engine may reclaim an executor.
pub const EXECUTOR_IDLE_TIMEOUT_S: u64 = 60;

/// Fixed coordination ports. One session is live at a time, so the
/// ports never need to vary within a process.
pub const DRIVER_PORT: u16 = 40400;
pub const BLOCK_MANAGER_PORT: u16 = 40401;

pub const DEFAULT_MASTER: &str = "local[*]";

/// Configuration consumed by the compute session collaborator.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub master: String,
    pub app_name: String,
    pub dynamic_allocation: bool,
    pub shuffle_tracking: bool,
    pub executor_idle_timeout_s: u64,
    pub executor_cores: u32,
    pub executor_memory: String,
    pub max_cores: u32,
    pub driver_port: u16,
    pub block_manager_port: u16,
}

impl SessionConfig {
    /// Builds a session config from a [`ClusterPlan`], applying the
    /// operational core ceiling.
    pub fn from_plan(app_name: &str, plan: &ClusterPlan) -> Self {
        SessionConfig {
            master: DEFAULT_MASTER.to_string(),
            app_name: app_name.to_string(),
            dynamic_allocation: true,
            shuffle_tracking: true,
            executor_idle_timeout_s: EXECUTOR_IDLE_TIMEOUT_S,
            executor_cores: plan.executor_cores,
            executor_memory: plan.executor_memory(),
            max_cores: plan.max_cores.min(CORE_CEILING),
            driver_port: DRIVER_PORT,
            block_manager_port: BLOCK_MANAGER_PORT,
        }
    }
}

/// Handle to one live compute session.
///
/// The harness constructs exactly one of these per repetition and
/// passes it by reference to the stages that need engine access.
/// Release happens on drop, so teardown is guaranteed on every exit
/// path, including early returns on error.
pub struct ComputeSession {
    config: SessionConfig,
}

impl ComputeSession {
    pub fn acquire(config: SessionConfig) -> BenchResult<Self> {
        if config.master.is_empty() {
            return Err(BenchError::Session("master address is empty".to_string()));
        }
        if config.executor_cores < 2 || config.executor_cores % 2 != 0 {
            return Err(BenchError::Session(format!(
                "executor_cores must be even and >= 2, got {}",
                config.executor_cores
            )));
        }
        if config.max_cores < config.executor_cores {
            return Err(BenchError::Session(format!(
                "max_cores {} below executor_cores {}",
                config.max_cores, config.executor_cores
            )));
        }
        if config.driver_port == 0 || config.block_manager_port == 0 {
            return Err(BenchError::Session("coordination port is zero".to_string()));
        }
        info!(
            app_name = %config.app_name,
            executor_cores = config.executor_cores,
            executor_memory = %config.executor_memory,
            max_cores = config.max_cores,
            "compute session acquired"
        );
        Ok(ComputeSession { config })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl Drop for ComputeSession {
    fn drop(&mut self) {
        debug!(app_name = %self.config.app_name, "compute session released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::SizeEstimator;

    #[test]
    fn config_from_plan_applies_core_ceiling() {
        let plan = SizeEstimator::plan(40u64 << 30);
        assert!(plan.max_cores > CORE_CEILING);
        let config = SessionConfig::from_plan("bench", &plan);
        assert_eq!(config.max_cores, CORE_CEILING);
        assert_eq!(config.executor_cores, plan.executor_cores);
        assert_eq!(config.executor_memory, plan.executor_memory());
    }

    #[test]
    fn acquire_validates_core_layout() {
        let plan = SizeEstimator::plan(0);
        let mut config = SessionConfig::from_plan("bench", &plan);
        config.executor_cores = 3;
        assert!(matches!(
            ComputeSession::acquire(config),
            Err(BenchError::Session(_))
        ));
    }

    #[test]
    fn acquire_and_release() {
        let plan = SizeEstimator::plan(1u64 << 30);
        let config = SessionConfig::from_plan("bench", &plan);
        let session = ComputeSession::acquire(config).unwrap();
        assert_eq!(session.config().app_name, "bench");
        drop(session);
    }
}
