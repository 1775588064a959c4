use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use crate::dataset::{load_ndjson, DatasetDescriptor, SchemaMode};
use crate::error::{BenchError, BenchResult};
use crate::evaluate::Evaluator;
use crate::filter::{FrequencyFilter, DEFAULT_TOP_K};
use crate::pipeline::{ClassifierKind, PipelineFactory};
use crate::results::{BenchmarkRow, ResultsTable};
use crate::session::{ComputeSession, SessionConfig};
use crate::sizing::{ClusterPlan, SizeEstimator};
use crate::split::{DeterministicSplitter, DEFAULT_SEED, DEFAULT_TEST_FRACTION};

pub const DEFAULT_REPETITIONS: usize = 5;

/// Benchmark parameters. Dataset paths and repetition count are the
/// only knobs exposed to the entry point; the rest are fixed protocol
/// constants with overridable defaults.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub dataset_paths: Vec<PathBuf>,
    pub repetitions: usize,
    pub top_k: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub classifier: ClassifierKind,
    pub schema: SchemaMode,
    pub app_name: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            dataset_paths: Vec::new(),
            repetitions: DEFAULT_REPETITIONS,
            top_k: DEFAULT_TOP_K,
            seed: DEFAULT_SEED,
            test_fraction: DEFAULT_TEST_FRACTION,
            classifier: ClassifierKind::Linear,
            schema: SchemaMode::InferFromData,
            app_name: "classification_benchmark".to_string(),
        }
    }
}

/// Timings and accuracy for one repetition. Held only until averaged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunMetrics {
    pub load_time_s: f64,
    pub train_time_s: f64,
    pub eval_time_s: f64,
    pub total_time_s: f64,
    pub accuracy: f64,
}

/// Arithmetic mean of every metric field, accuracy included. The
/// accuracy mean is an average of per-run accuracies, never a
/// recomputation from pooled predictions.
pub fn mean_metrics(runs: &[RunMetrics]) -> RunMetrics {
    let n = runs.len() as f64;
    RunMetrics {
        load_time_s: runs.iter().map(|r| r.load_time_s).sum::<f64>() / n,
        train_time_s: runs.iter().map(|r| r.train_time_s).sum::<f64>() / n,
        eval_time_s: runs.iter().map(|r| r.eval_time_s).sum::<f64>() / n,
        total_time_s: runs.iter().map(|r| r.total_time_s).sum::<f64>() / n,
        accuracy: runs.iter().map(|r| r.accuracy).sum::<f64>() / n,
    }
}

/// Per-dataset outcome: either an averaged row or the error that
/// aborted the dataset's repetitions.
pub struct DatasetOutcome {
    pub dataset_name: String,
    pub result: BenchResult<BenchmarkRow>,
}

/// Sequential orchestrator: per dataset and per repetition, sizes a
/// session, loads, filters, splits, trains, evaluates, and tears the
/// session down, then averages the repetitions into one row.
pub struct BenchmarkHarness {
    config: BenchmarkConfig,
}

impl BenchmarkHarness {
    /// Validates the protocol parameters up front; once running, every
    /// error is contained to the dataset that raised it.
    pub fn new(config: BenchmarkConfig) -> BenchResult<Self> {
        if config.dataset_paths.is_empty() {
            return Err(BenchError::Config("no datasets configured".to_string()));
        }
        if config.repetitions == 0 {
            return Err(BenchError::Config(
                "repetitions must be at least 1".to_string(),
            ));
        }
        // Fail on an invalid fraction before any session is built.
        DeterministicSplitter::new(config.seed, config.test_fraction)?;
        Ok(BenchmarkHarness { config })
    }

    /// Benchmarks every configured dataset in order. A dataset whose
    /// processing fails is logged and skipped; partial results are
    /// preserved.
    pub fn run(&self) -> Vec<DatasetOutcome> {
        let mut outcomes = Vec::with_capacity(self.config.dataset_paths.len());
        for path in &self.config.dataset_paths {
            let dataset_name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            info!(dataset = %dataset_name, "benchmarking dataset");
            let result = self.bench_dataset(path);
            if let Err(error) = &result {
                warn!(dataset = %dataset_name, %error, "dataset benchmark failed");
            }
            outcomes.push(DatasetOutcome {
                dataset_name,
                result,
            });
        }
        outcomes
    }

    /// Collects the successful outcomes into a results table, in
    /// benchmark order. Failed datasets are absent, not zero rows.
    pub fn collect(outcomes: &[DatasetOutcome]) -> ResultsTable {
        let mut table = ResultsTable::new();
        for outcome in outcomes {
            if let Ok(row) = &outcome.result {
                table.append(row.clone());
            }
        }
        table
    }

    fn bench_dataset(&self, path: &std::path::Path) -> BenchResult<BenchmarkRow> {
        let descriptor = DatasetDescriptor::probe(path)?;
        let plan = SizeEstimator::plan(descriptor.byte_size);

        let mut runs = Vec::with_capacity(self.config.repetitions);
        for repetition in 0..self.config.repetitions {
            let metrics = self.run_once(&descriptor, &plan)?;
            info!(
                dataset = %descriptor.name(),
                repetition,
                total_time_s = metrics.total_time_s,
                accuracy = metrics.accuracy,
                "repetition finished"
            );
            runs.push(metrics);
        }

        let mean = mean_metrics(&runs);
        Ok(BenchmarkRow {
            dataset_name: descriptor.name(),
            byte_size_gb: descriptor.byte_size_gb(),
            executor_cores: plan.executor_cores,
            executor_memory: plan.executor_memory(),
            max_cores: plan.max_cores,
            load_time_s: mean.load_time_s,
            train_time_s: mean.train_time_s,
            eval_time_s: mean.eval_time_s,
            total_time_s: mean.total_time_s,
            accuracy: mean.accuracy,
        })
    }

    /// One repetition. The session is a scoped local, so teardown
    /// happens on every exit path, early error returns included.
    fn run_once(
        &self,
        descriptor: &DatasetDescriptor,
        plan: &ClusterPlan,
    ) -> BenchResult<RunMetrics> {
        let session =
            ComputeSession::acquire(SessionConfig::from_plan(&self.config.app_name, plan))?;
        let wall_clock = Instant::now();

        let frame = load_ndjson(&session, descriptor, &self.config.schema)?;
        let load_time_s = wall_clock.elapsed().as_secs_f64();

        let filtered = FrequencyFilter::new(self.config.top_k).apply(&frame)?;
        let splitter = DeterministicSplitter::new(self.config.seed, self.config.test_fraction)?;
        let (train, test) = splitter.split(&filtered);

        let train_start = Instant::now();
        let pipeline = PipelineFactory::classification_pipeline(self.config.classifier);
        let fitted = pipeline.fit(&train)?;
        let train_time_s = train_start.elapsed().as_secs_f64();

        let eval_start = Instant::now();
        let scored = fitted.transform(&test)?;
        let accuracy = Evaluator::default().accuracy(&scored)?;
        let eval_time_s = eval_start.elapsed().as_secs_f64();

        drop(session);
        let total_time_s = wall_clock.elapsed().as_secs_f64();

        Ok(RunMetrics {
            load_time_s,
            train_time_s,
            eval_time_s,
            total_time_s,
            accuracy,
        })
    }
}
