use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use classification_benchmark_rs::benchmark::{BenchmarkConfig, BenchmarkHarness};
use classification_benchmark_rs::results::read_benchmark_rows;

const N_REPETITIONS: usize = 5;
const OUTPUT_CSV: &str = "benchmark_results.csv";
const OUTPUT_JSON: &str = "benchmark_results.json";

fn main() {
    tracing_subscriber::fmt::init();

    // Get the command-line arguments
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <dataset>...", args[0]);
        eprintln!("  <dataset>  - NDJSON corpus file, or a directory of them");
        std::process::exit(1);
    }

    let mut dataset_paths: Vec<PathBuf> = Vec::new();
    for arg in &args[1..] {
        let path = Path::new(arg);
        if path.is_dir() {
            // Pick up every NDJSON corpus in the directory.
            let mut entries: Vec<PathBuf> = match fs::read_dir(path) {
                Ok(entries) => entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| {
                        p.is_file()
                            && p.extension()
                                .map(|ext| ext == "ndjson" || ext == "json")
                                .unwrap_or(false)
                    })
                    .collect(),
                Err(error) => {
                    eprintln!("Error: cannot read directory '{}': {}", arg, error);
                    std::process::exit(1);
                }
            };
            entries.sort();
            dataset_paths.extend(entries);
        } else {
            dataset_paths.push(path.to_path_buf());
        }
    }

    let config = BenchmarkConfig {
        dataset_paths,
        repetitions: N_REPETITIONS,
        ..BenchmarkConfig::default()
    };
    let harness = match BenchmarkHarness::new(config) {
        Ok(harness) => harness,
        Err(error) => {
            eprintln!("Error: {}", error);
            std::process::exit(1);
        }
    };

    let outcomes = harness.run();
    for outcome in &outcomes {
        if let Err(error) = &outcome.result {
            eprintln!(
                "Benchmark failed for dataset '{}': {}",
                outcome.dataset_name, error
            );
        }
    }

    let table = BenchmarkHarness::collect(&outcomes);
    if table.is_empty() {
        eprintln!("No dataset produced results.");
        std::process::exit(1);
    }

    if let Err(error) = table.write_csv(OUTPUT_CSV) {
        eprintln!("Failed to write '{}': {}", OUTPUT_CSV, error);
    }
    if let Err(error) = table.append_to_json(OUTPUT_JSON) {
        eprintln!("Failed to update '{}': {}", OUTPUT_JSON, error);
    }

    // Print everything persisted so far, this run included.
    let persisted = read_benchmark_rows(OUTPUT_JSON);
    println!("\nBenchmark results ({} datasets on record):", persisted.len());
    table.print();
}
