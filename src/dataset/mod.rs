use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};
use crate::frame::{Column, Frame};
use crate::session::ComputeSession;

pub const CATEGORY: &str = "category";
pub const PRIMARY_TEXT: &str = "primary_text";
pub const SECONDARY_TEXT: &str = "secondary_text";

/// The three columns a loaded frame always carries.
pub const REQUIRED_FIELDS: [&str; 3] = [CATEGORY, PRIMARY_TEXT, SECONDARY_TEXT];

/// A dataset's location and probed size, taken before session
/// construction and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub path: PathBuf,
    pub byte_size: u64,
}

impl DatasetDescriptor {
    /// Probes `path` for its on-disk size.
    pub fn probe<P: AsRef<Path>>(path: P) -> BenchResult<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)
            .map_err(|_| BenchError::DatasetNotFound(path.to_path_buf()))?;
        Ok(DatasetDescriptor {
            path: path.to_path_buf(),
            byte_size: metadata.len(),
        })
    }

    /// Dataset name for reporting: the file stem.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    pub fn byte_size_gb(&self) -> f64 {
        self.byte_size as f64 / (1u64 << 30) as f64
    }
}

/// One social-media post. Records with any absent field are kept by the
/// loader and dropped later by the frequency filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub primary_text: Option<String>,
    #[serde(default)]
    pub secondary_text: Option<String>,
}

/// How the loader decides which fields to read.
#[derive(Debug, Clone)]
pub enum SchemaMode {
    /// Read every known field present in the data.
    InferFromData,
    /// Read only the listed fields; everything else is treated as
    /// absent.
    Fixed(Vec<String>),
}

impl SchemaMode {
    fn keeps(&self, field: &str) -> bool {
        match self {
            SchemaMode::InferFromData => true,
            SchemaMode::Fixed(fields) => fields.iter().any(|f| f == field),
        }
    }
}

/// Reads a newline-delimited JSON dataset into a [`Frame`] with the
/// three required columns. Unknown fields in the input are ignored;
/// blank lines are skipped. The session handle is the engine access
/// token; loading is an engine-side operation.
pub fn load_ndjson(
    _session: &ComputeSession,
    descriptor: &DatasetDescriptor,
    schema: &SchemaMode,
) -> BenchResult<Frame> {
    let file = File::open(&descriptor.path)
        .map_err(|_| BenchError::DatasetNotFound(descriptor.path.clone()))?;
    let reader = BufReader::new(file);

    let mut categories = Vec::new();
    let mut primaries = Vec::new();
    let mut secondaries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(&line)?;
        categories.push(record.category.filter(|_| schema.keeps(CATEGORY)));
        primaries.push(record.primary_text.filter(|_| schema.keeps(PRIMARY_TEXT)));
        secondaries.push(
            record
                .secondary_text
                .filter(|_| schema.keeps(SECONDARY_TEXT)),
        );
    }

    let mut frame = Frame::new();
    frame.insert(CATEGORY, Column::Str(categories))?;
    frame.insert(PRIMARY_TEXT, Column::Str(primaries))?;
    frame.insert(SECONDARY_TEXT, Column::Str(secondaries))?;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use crate::sizing::SizeEstimator;
    use std::io::Write;

    fn test_session() -> ComputeSession {
        let plan = SizeEstimator::plan(0);
        ComputeSession::acquire(SessionConfig::from_plan("test", &plan)).unwrap()
    }

    fn write_fixture(name: &str, lines: &[&str]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "classification_benchmark_{}_{}.ndjson",
            name,
            std::process::id()
        ));
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn loads_both_accepted_shapes_and_ignores_extras() {
        let path = write_fixture(
            "shapes",
            &[
                r#"{"category":"news","primary_text":"a","secondary_text":"b","extra":1}"#,
                r#"{"category":"sports"}"#,
                "",
            ],
        );
        let descriptor = DatasetDescriptor::probe(&path).unwrap();
        let session = test_session();
        let frame = load_ndjson(&session, &descriptor, &SchemaMode::InferFromData).unwrap();
        assert_eq!(frame.len(), 2);
        let secondaries = frame.strings(SECONDARY_TEXT).unwrap();
        assert_eq!(secondaries[0].as_deref(), Some("b"));
        assert_eq!(secondaries[1], None);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn fixed_schema_drops_unlisted_fields() {
        let path = write_fixture(
            "fixed",
            &[r#"{"category":"news","primary_text":"a","secondary_text":"b"}"#],
        );
        let descriptor = DatasetDescriptor::probe(&path).unwrap();
        let session = test_session();
        let schema = SchemaMode::Fixed(vec![CATEGORY.to_string(), PRIMARY_TEXT.to_string()]);
        let frame = load_ndjson(&session, &descriptor, &schema).unwrap();
        assert_eq!(frame.strings(SECONDARY_TEXT).unwrap()[0], None);
        assert_eq!(
            frame.strings(PRIMARY_TEXT).unwrap()[0].as_deref(),
            Some("a")
        );
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn probe_missing_path_is_dataset_not_found() {
        let err = DatasetDescriptor::probe("/nonexistent/corpus.ndjson").unwrap_err();
        assert!(matches!(err, BenchError::DatasetNotFound(_)));
    }

    #[test]
    fn malformed_line_is_a_parse_error() {
        let path = write_fixture("malformed", &[r#"{"category": nope}"#]);
        let descriptor = DatasetDescriptor::probe(&path).unwrap();
        let session = test_session();
        let result = load_ndjson(&session, &descriptor, &SchemaMode::InferFromData);
        assert!(matches!(result, Err(BenchError::Json(_))));
        std::fs::remove_file(path).unwrap();
    }
}
