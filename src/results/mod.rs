use std::fs;
use std::path::Path;

use prettytable::{row, Table};
use serde::{Deserialize, Serialize};

use crate::error::BenchResult;

/// One benchmarked dataset, averaged over its repetitions. Field order
/// is the persisted column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRow {
    pub dataset_name: String,
    pub byte_size_gb: f64,
    pub executor_cores: u32,
    pub executor_memory: String,
    pub max_cores: u32,
    pub load_time_s: f64,
    pub train_time_s: f64,
    pub eval_time_s: f64,
    pub total_time_s: f64,
    pub accuracy: f64,
}

/// Append-only collection of benchmark rows, one per dataset, in the
/// order the datasets were benchmarked.
#[derive(Debug, Default)]
pub struct ResultsTable {
    rows: Vec<BenchmarkRow>,
}

impl ResultsTable {
    pub fn new() -> Self {
        ResultsTable::default()
    }

    pub fn append(&mut self, row: BenchmarkRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[BenchmarkRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Prints the table in a human-readable form.
    pub fn print(&self) {
        let mut table = Table::new();
        table.add_row(row![
            "Dataset",
            "Size (GB)",
            "Exec Cores",
            "Exec Memory",
            "Max Cores",
            "Load (s)",
            "Train (s)",
            "Eval (s)",
            "Total (s)",
            "Accuracy"
        ]);
        for result in &self.rows {
            table.add_row(row![
                &result.dataset_name,
                format!("{:.3}", result.byte_size_gb),
                result.executor_cores,
                &result.executor_memory,
                result.max_cores,
                format!("{:.3}", result.load_time_s),
                format!("{:.3}", result.train_time_s),
                format!("{:.3}", result.eval_time_s),
                format!("{:.3}", result.total_time_s),
                format!("{:.4}", result.accuracy),
            ]);
        }
        table.printstd();
    }

    /// Writes the persisted artifact: one CSV row per dataset with the
    /// fixed column set.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> BenchResult<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Appends this table's rows to a JSON results file, keeping any
    /// rows already persisted there.
    pub fn append_to_json<P: AsRef<Path>>(&self, path: P) -> BenchResult<()> {
        let path = path.as_ref();
        let mut persisted: Vec<BenchmarkRow> = if path.exists() {
            serde_json::from_str(&fs::read_to_string(path)?)?
        } else {
            Vec::new()
        };
        persisted.extend(self.rows.iter().cloned());
        fs::write(path, serde_json::to_string_pretty(&persisted)?)?;
        Ok(())
    }
}

/// Reads previously persisted rows, starting fresh when the file is
/// missing or unparsable.
pub fn read_benchmark_rows<P: AsRef<Path>>(path: P) -> Vec<BenchmarkRow> {
    let path = path.as_ref();
    if !path.exists() {
        return Vec::new();
    }
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|_| {
            tracing::warn!(path = %path.display(), "unparsable results file, starting fresh");
            Vec::new()
        }),
        Err(_) => Vec::new(),
    }
}
